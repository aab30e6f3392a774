//! Postgres-backed data source for dashboard KPIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{CompletedWorkRecord, UserRole, STATUS_COMPLETED, STATUS_HIGH_PRIORITY};
use domain::services::{KpiDataSource, SourceError};
use sqlx::PgPool;

use crate::db::is_transport_error;
use crate::repositories::{UserRepository, WorkOrderRepository};

/// Maps a database error onto the data source error taxonomy.
pub fn classify_error(err: sqlx::Error) -> SourceError {
    if is_transport_error(&err) {
        SourceError::Transport(err.to_string())
    } else {
        SourceError::Query(err.to_string())
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Reads dashboard inputs straight from the backend database.
#[derive(Clone)]
pub struct PgKpiDataSource {
    pool: PgPool,
    users: UserRepository,
    work_orders: WorkOrderRepository,
}

impl PgKpiDataSource {
    /// Create a new data source instance.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            work_orders: WorkOrderRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl KpiDataSource for PgKpiDataSource {
    async fn count_active_technicians(&self) -> Result<Option<u64>, SourceError> {
        self.users
            .count_active_by_role(UserRole::Technician)
            .await
            .map(|n| Some(to_count(n)))
            .map_err(classify_error)
    }

    async fn count_pending_high_priority(&self) -> Result<Option<u64>, SourceError> {
        self.work_orders
            .count_unarchived_by_status(STATUS_HIGH_PRIORITY)
            .await
            .map(|n| Some(to_count(n)))
            .map_err(classify_error)
    }

    async fn list_active_statuses(&self) -> Result<Option<Vec<String>>, SourceError> {
        let rows = self
            .work_orders
            .list_unarchived_statuses()
            .await
            .map_err(classify_error)?;
        Ok(Some(rows.into_iter().map(|row| row.status).collect()))
    }

    async fn list_completed_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Option<Vec<CompletedWorkRecord>>, SourceError> {
        let rows = self
            .work_orders
            .list_completed_since(STATUS_COMPLETED, since)
            .await
            .map_err(classify_error)?;
        Ok(Some(rows.into_iter().map(CompletedWorkRecord::from).collect()))
    }

    async fn ping(&self) -> Result<(), SourceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(classify_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error() {
        assert!(classify_error(sqlx::Error::PoolTimedOut).is_fatal());
        assert!(classify_error(sqlx::Error::PoolClosed).is_fatal());

        let err = classify_error(sqlx::Error::ColumnNotFound("archived".to_string()));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("archived"));
    }

    #[test]
    fn test_to_count() {
        assert_eq!(to_count(0), 0);
        assert_eq!(to_count(42), 42);
        assert_eq!(to_count(-1), 0);
    }
}
