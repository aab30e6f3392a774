//! Expired session purge job.

use std::sync::Arc;
use tracing::debug;

use super::scheduler::{Job, JobFrequency};
use crate::services::SessionStore;

/// Drops sessions whose TTL has elapsed but were never presented again.
pub struct SessionCleanupJob {
    sessions: Arc<SessionStore>,
}

impl SessionCleanupJob {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }
}

#[async_trait::async_trait]
impl Job for SessionCleanupJob {
    fn name(&self) -> &'static str {
        "session_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(5)
    }

    async fn execute(&self) -> Result<(), String> {
        let purged = self.sessions.purge_expired().await;
        debug!(purged, "Expired sessions purged");
        metrics::gauge!("sessions_active").set(self.sessions.len().await as f64);
        Ok(())
    }
}
