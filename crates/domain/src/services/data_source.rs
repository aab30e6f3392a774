//! Read access to the records the dashboard aggregates.
//!
//! The backend owns the data; the dashboard only needs four read queries,
//! each of which may fail or return nothing independently of the others.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::models::{CompletedWorkRecord, KpiSection, UserRecord, WorkOrderRecord};

/// Errors raised by a data source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The query itself failed (bad filter, decode error, permission).
    /// Only the affected section is lost.
    #[error("Query failed: {0}")]
    Query(String),

    /// The backend could not be reached at all.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl SourceError {
    /// Whether this error should abort the whole aggregation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SourceError::Transport(_))
    }
}

/// The four independent reads behind the dashboard KPIs.
///
/// `Ok(None)` means the backend answered without a value (a count or list
/// that came back null); callers treat it like zero/empty.
#[async_trait::async_trait]
pub trait KpiDataSource: Send + Sync {
    /// Users with role `TECHNICIAN` and `is_active = true`.
    async fn count_active_technicians(&self) -> Result<Option<u64>, SourceError>;

    /// Work orders with status `HIGH_PRIORITY` that are not archived.
    async fn count_pending_high_priority(&self) -> Result<Option<u64>, SourceError>;

    /// Status tokens of every non-archived work order.
    async fn list_active_statuses(&self) -> Result<Option<Vec<String>>, SourceError>;

    /// Completed work orders with `completed_at >= since`.
    async fn list_completed_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Option<Vec<CompletedWorkRecord>>, SourceError>;

    /// Cheap reachability probe used by readiness checks.
    async fn ping(&self) -> Result<(), SourceError>;
}

/// Data source backed by in-process records.
///
/// Applies the same filters the backend queries do. Failures and latency
/// can be injected per section for development and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    users: Vec<UserRecord>,
    work_orders: Vec<WorkOrderRecord>,
    failures: HashMap<KpiSection, SourceError>,
    empty_sections: Vec<KpiSection>,
    delays: HashMap<KpiSection, Duration>,
    ping_delay: Option<Duration>,
    unreachable: bool,
}

impl InMemoryDataSource {
    pub fn new(users: Vec<UserRecord>, work_orders: Vec<WorkOrderRecord>) -> Self {
        Self {
            users,
            work_orders,
            ..Default::default()
        }
    }

    /// Make `section` fail with `error`.
    pub fn with_failure(mut self, section: KpiSection, error: SourceError) -> Self {
        self.failures.insert(section, error);
        self
    }

    /// Make `section` answer with no value at all.
    pub fn with_empty_response(mut self, section: KpiSection) -> Self {
        self.empty_sections.push(section);
        self
    }

    /// Delay the answer for `section`.
    pub fn with_delay(mut self, section: KpiSection, delay: Duration) -> Self {
        self.delays.insert(section, delay);
        self
    }

    /// Delay the answer to `ping`.
    pub fn with_ping_delay(mut self, delay: Duration) -> Self {
        self.ping_delay = Some(delay);
        self
    }

    /// Make every call, including `ping`, fail with a transport error.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    async fn enter(&self, section: KpiSection) -> Result<bool, SourceError> {
        if let Some(delay) = self.delays.get(&section) {
            tokio::time::sleep(*delay).await;
        }
        if self.unreachable {
            return Err(SourceError::Transport("connection refused".to_string()));
        }
        if let Some(error) = self.failures.get(&section) {
            return Err(error.clone());
        }
        Ok(!self.empty_sections.contains(&section))
    }
}

#[async_trait::async_trait]
impl KpiDataSource for InMemoryDataSource {
    async fn count_active_technicians(&self) -> Result<Option<u64>, SourceError> {
        if !self.enter(KpiSection::ActiveTechnicians).await? {
            return Ok(None);
        }
        let count = self
            .users
            .iter()
            .filter(|u| u.is_active_technician())
            .count();
        Ok(Some(count as u64))
    }

    async fn count_pending_high_priority(&self) -> Result<Option<u64>, SourceError> {
        if !self.enter(KpiSection::HighPriorityPending).await? {
            return Ok(None);
        }
        let count = self
            .work_orders
            .iter()
            .filter(|w| w.is_high_priority_pending())
            .count();
        Ok(Some(count as u64))
    }

    async fn list_active_statuses(&self) -> Result<Option<Vec<String>>, SourceError> {
        if !self.enter(KpiSection::WorksByStatus).await? {
            return Ok(None);
        }
        let statuses = self
            .work_orders
            .iter()
            .filter(|w| !w.archived)
            .map(|w| w.status.clone())
            .collect();
        Ok(Some(statuses))
    }

    async fn list_completed_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Option<Vec<CompletedWorkRecord>>, SourceError> {
        if !self.enter(KpiSection::CompletedWorks).await? {
            return Ok(None);
        }
        let completed = self
            .work_orders
            .iter()
            .filter(|w| w.is_completed_since(since))
            .map(CompletedWorkRecord::from)
            .collect();
        Ok(Some(completed))
    }

    async fn ping(&self) -> Result<(), SourceError> {
        if let Some(delay) = self.ping_delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable {
            return Err(SourceError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}
