//! User repository for database operations.

use domain::models::UserRole;
use sqlx::PgPool;

use crate::metrics::QueryTimer;

/// Repository for read queries on the `users` table.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count active users with the given role.
    pub async fn count_active_by_role(&self, role: UserRole) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_active_users_by_role");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE role = $1 AND is_active = true
            "#,
        )
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
