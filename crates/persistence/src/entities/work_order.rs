//! Work order entities (database row mappings for the `works` table).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Status column of a work order row.
#[derive(Debug, Clone, FromRow)]
pub struct WorkStatusEntity {
    pub status: String,
}

/// Timestamps of a completed work order row.
#[derive(Debug, Clone, FromRow)]
pub struct CompletedWorkEntity {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<CompletedWorkEntity> for domain::models::CompletedWorkRecord {
    fn from(entity: CompletedWorkEntity) -> Self {
        Self {
            started_at: entity.started_at,
            completed_at: entity.completed_at,
        }
    }
}
