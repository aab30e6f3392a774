//! Work order repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::{CompletedWorkEntity, WorkStatusEntity};
use crate::metrics::QueryTimer;

/// Repository for read queries on the `works` table.
#[derive(Clone)]
pub struct WorkOrderRepository {
    pool: PgPool,
}

impl WorkOrderRepository {
    /// Creates a new WorkOrderRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count non-archived work orders with the given status.
    pub async fn count_unarchived_by_status(&self, status: &str) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_unarchived_works_by_status");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM works
            WHERE status = $1 AND archived = false
            "#,
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Status of every non-archived work order.
    pub async fn list_unarchived_statuses(&self) -> Result<Vec<WorkStatusEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_unarchived_work_statuses");
        let result = sqlx::query_as::<_, WorkStatusEntity>(
            r#"
            SELECT status
            FROM works
            WHERE archived = false
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Work orders with the given status completed at or after `since`.
    pub async fn list_completed_since(
        &self,
        status: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CompletedWorkEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_completed_works_since");
        let result = sqlx::query_as::<_, CompletedWorkEntity>(
            r#"
            SELECT started_at, completed_at
            FROM works
            WHERE status = $1 AND completed_at >= $2
            "#,
        )
        .bind(status)
        .bind(since)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
