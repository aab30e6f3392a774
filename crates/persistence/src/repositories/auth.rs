//! Authentication RPC access.
//!
//! The credential check lives in the backend as the SQL function
//! `login_with_username(p_username, p_password)`, which returns a JSON
//! payload. This module only invokes it.

use async_trait::async_trait;
use domain::models::LoginPayload;
use domain::services::{AuthGateway, GatewayError};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::is_transport_error;
use crate::metrics::QueryTimer;

/// Calls the backend's login function over a Postgres connection.
#[derive(Clone)]
pub struct PgAuthGateway {
    pool: PgPool,
}

impl PgAuthGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn classify_error(err: sqlx::Error) -> GatewayError {
    if is_transport_error(&err) {
        GatewayError::Transport(err.to_string())
    } else {
        GatewayError::Rpc(err.to_string())
    }
}

#[async_trait]
impl AuthGateway for PgAuthGateway {
    async fn login_with_username(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<LoginPayload>, GatewayError> {
        let timer = QueryTimer::new("login_with_username");
        let result = sqlx::query_scalar::<_, Option<Json<LoginPayload>>>(
            "SELECT login_with_username(p_username => $1, p_password => $2)::json",
        )
        .bind(username)
        .bind(password)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        let payload = result.map_err(classify_error)?;
        Ok(payload.map(|Json(p)| p))
    }
}
