//! Authentication routes: login against the backend RPC and logout.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use domain::models::AuthenticatedUser;
use domain::services::AuthError;
use serde::{Deserialize, Serialize};
use shared::crypto::token_fingerprint;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_login_attempt;
use crate::services::SessionContext;

/// Request body for login.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        length(max = 256, message = "Username is too long"),
        custom(function = "shared::validation::validate_username")
    )]
    #[serde(default)]
    pub username: String,

    #[validate(length(min = 1, max = 256, message = "Password must be 1-256 characters"))]
    #[serde(default)]
    pub password: String,
}

/// The signed-in user as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub display_name: String,
    pub role: String,
    pub role_label: String,
}

impl From<&AuthenticatedUser> for UserResponse {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            display_name: user.display_name().to_string(),
            role: user.role.as_str().to_string(),
            role_label: user.role.label().to_string(),
        }
    }
}

/// Response body for a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub session_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

/// Authenticate with username and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let username = request.username.trim();
    let success = match state.login.login(username, &request.password).await {
        Ok(success) => success,
        Err(err) => {
            let outcome = match &err {
                AuthError::Rejected(_) => "rejected",
                AuthError::Unavailable(_) => "unavailable",
                AuthError::MalformedResponse(_) => "error",
            };
            record_login_attempt(outcome);
            tracing::info!(username = %username, outcome, "Login failed");
            return Err(err.into());
        }
    };

    let session = state
        .sessions
        .insert(&success.session_token, success.user.clone())
        .await;
    record_login_attempt("success");

    tracing::info!(
        username = %success.user.username,
        session = %token_fingerprint(&success.session_token),
        expires_at = %session.expires_at,
        "Session established"
    );

    Ok(Json(LoginResponse {
        token_type: "Bearer".to_string(),
        expires_at: session.expires_at,
        user: UserResponse::from(&success.user),
        session_token: success.session_token,
    }))
}

/// End the current session.
///
/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> StatusCode {
    if state.sessions.revoke(&session.token_hash).await {
        tracing::info!(username = %session.user.username, "User logged out");
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::UserRole;
    use shared::validation::MAX_CREDENTIAL_LENGTH;

    fn request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_request_valid() {
        assert!(request("tech01", "secret").validate().is_ok());
    }

    #[test]
    fn test_login_request_blank_username() {
        let errors = request("   ", "secret").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_login_request_empty_password() {
        let errors = request("tech01", "").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_login_request_control_characters() {
        assert!(request("tech\n01", "secret").validate().is_err());
    }

    #[test]
    fn test_login_request_too_long() {
        let long = "a".repeat(MAX_CREDENTIAL_LENGTH + 1);
        assert!(request(&long, "secret").validate().is_err());
        assert!(request("tech01", &long).validate().is_err());
    }

    #[test]
    fn test_login_request_missing_fields_deserialize_as_empty() {
        let request: LoginRequest = serde_json::from_str(r#"{"username":"tech01"}"#).unwrap();
        assert_eq!(request.password, "");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_user_response_labels_role() {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            username: "tech01".into(),
            role: UserRole::Technician,
            full_name: None,
        };
        let response = UserResponse::from(&user);
        assert_eq!(response.role, "TECHNICIAN");
        assert_eq!(response.role_label, "Technician");
        assert_eq!(response.display_name, "tech01");
    }
}
