//! Login flow against the backend's authentication RPC.
//!
//! The backend decides whether credentials are valid; this module only
//! calls it, interprets the answer and turns it into a session.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{AuthenticatedUser, LoginPayload, LoginSuccess, UserRole};

/// Message shown when the backend rejects a login without saying why.
pub const DEFAULT_REJECTION_MESSAGE: &str = "Invalid credentials";

/// Message shown when the backend cannot be reached and gives no detail.
pub const DEFAULT_CONNECTION_MESSAGE: &str = "Connection error";

/// Errors raised by an authentication gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Rpc(String),
}

/// Errors that can occur while logging in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The backend refused the credentials. The message is user-facing.
    #[error("{0}")]
    Rejected(String),

    /// The authentication RPC could not be completed.
    #[error("{0}")]
    Unavailable(String),

    /// The backend reported success but the payload is unusable.
    #[error("Malformed login response: {0}")]
    MalformedResponse(String),
}

/// The remote authentication call.
#[async_trait::async_trait]
pub trait AuthGateway: Send + Sync {
    /// Invoke `login_with_username(p_username, p_password)`.
    ///
    /// `Ok(None)` means the RPC returned no payload.
    async fn login_with_username(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<LoginPayload>, GatewayError>;
}

/// Interprets the authentication RPC.
#[derive(Clone)]
pub struct LoginService {
    gateway: Arc<dyn AuthGateway>,
}

impl LoginService {
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        Self { gateway }
    }

    /// Log in with username and password.
    ///
    /// No retry is attempted on failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSuccess, AuthError> {
        let payload = self
            .gateway
            .login_with_username(username, password)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Login RPC failed");
                let message = e.to_string();
                if message.trim().is_empty() {
                    AuthError::Unavailable(DEFAULT_CONNECTION_MESSAGE.to_string())
                } else {
                    AuthError::Unavailable(message)
                }
            })?;

        let payload = match payload {
            Some(p) if p.success => p,
            Some(p) => {
                let message = p
                    .error
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string());
                return Err(AuthError::Rejected(message));
            }
            None => return Err(AuthError::Rejected(DEFAULT_REJECTION_MESSAGE.to_string())),
        };

        let success = into_login_success(payload)?;
        tracing::info!(
            user_id = %success.user.user_id,
            role = %success.user.role,
            "User logged in"
        );
        Ok(success)
    }
}

fn into_login_success(payload: LoginPayload) -> Result<LoginSuccess, AuthError> {
    let missing = |field: &str| AuthError::MalformedResponse(format!("missing {}", field));

    let session_token = payload
        .session_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("session_token"))?;
    let user_id = payload.user_id.ok_or_else(|| missing("user_id"))?;
    let username = payload.username.ok_or_else(|| missing("username"))?;
    let role = payload.role.ok_or_else(|| missing("role"))?;
    let role = UserRole::from_str(&role).map_err(AuthError::MalformedResponse)?;

    Ok(LoginSuccess {
        session_token,
        user: AuthenticatedUser {
            user_id,
            username,
            role,
            full_name: payload.full_name,
        },
    })
}

/// Account known to [`InMemoryAuthGateway`].
#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthenticatedUser,
    active: bool,
}

/// Authentication gateway backed by in-process accounts.
///
/// Answers with the same payload shapes as the backend RPC. Issued session
/// tokens are `"{username}-session-{uuid}"`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthGateway {
    accounts: HashMap<String, Account>,
    unavailable: bool,
}

impl InMemoryAuthGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account that can log in.
    pub fn with_account(mut self, password: &str, user: AuthenticatedUser) -> Self {
        self.accounts.insert(
            user.username.clone(),
            Account {
                password: password.to_string(),
                user,
                active: true,
            },
        );
        self
    }

    /// Register an account whose logins the backend refuses as inactive.
    pub fn with_inactive_account(mut self, password: &str, user: AuthenticatedUser) -> Self {
        self.accounts.insert(
            user.username.clone(),
            Account {
                password: password.to_string(),
                user,
                active: false,
            },
        );
        self
    }

    /// Make every call fail at the transport level.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

#[async_trait::async_trait]
impl AuthGateway for InMemoryAuthGateway {
    async fn login_with_username(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<LoginPayload>, GatewayError> {
        if self.unavailable {
            return Err(GatewayError::Transport(
                "error sending request: connection refused".to_string(),
            ));
        }

        let account = match self.accounts.get(username) {
            Some(a) if a.password == password => a,
            _ => {
                return Ok(Some(LoginPayload {
                    success: false,
                    error: Some("Invalid username or password".to_string()),
                    ..Default::default()
                }))
            }
        };

        if !account.active {
            return Ok(Some(LoginPayload {
                success: false,
                error: Some("User account is disabled".to_string()),
                ..Default::default()
            }));
        }

        let user = &account.user;
        Ok(Some(LoginPayload {
            success: true,
            user_id: Some(user.user_id),
            username: Some(user.username.clone()),
            role: Some(user.role.as_str().to_string()),
            full_name: user.full_name.clone(),
            session_token: Some(format!("{}-session-{}", user.username, uuid::Uuid::new_v4())),
            error: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn technician() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            username: "mlopez".to_string(),
            role: UserRole::Technician,
            full_name: Some("María López".to_string()),
        }
    }

    struct FixedGateway(Result<Option<LoginPayload>, GatewayError>);

    #[async_trait::async_trait]
    impl AuthGateway for FixedGateway {
        async fn login_with_username(
            &self,
            _username: &str,
            _password: &str,
        ) -> Result<Option<LoginPayload>, GatewayError> {
            self.0.clone()
        }
    }

    fn service(result: Result<Option<LoginPayload>, GatewayError>) -> LoginService {
        LoginService::new(Arc::new(FixedGateway(result)))
    }

    #[tokio::test]
    async fn test_login_success() {
        let user = technician();
        let service = LoginService::new(Arc::new(
            InMemoryAuthGateway::new().with_account("s3cret", user.clone()),
        ));

        let success = service.login("mlopez", "s3cret").await.unwrap();
        assert_eq!(success.user, user);
        assert!(success.session_token.starts_with("mlopez-session-"));
    }

    #[tokio::test]
    async fn test_login_wrong_password_surfaces_backend_message() {
        let service = LoginService::new(Arc::new(
            InMemoryAuthGateway::new().with_account("s3cret", technician()),
        ));
        let err = service.login("mlopez", "nope").await.unwrap_err();
        assert_eq!(
            err,
            AuthError::Rejected("Invalid username or password".to_string())
        );
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let service = LoginService::new(Arc::new(
            InMemoryAuthGateway::new().with_inactive_account("s3cret", technician()),
        ));
        let err = service.login("mlopez", "s3cret").await.unwrap_err();
        assert_eq!(err.to_string(), "User account is disabled");
    }

    #[tokio::test]
    async fn test_login_rejection_without_message_uses_default() {
        let err = service(Ok(Some(LoginPayload::default())))
            .login("a", "b")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Rejected(DEFAULT_REJECTION_MESSAGE.to_string()));

        let err = service(Ok(None)).login("a", "b").await.unwrap_err();
        assert_eq!(err, AuthError::Rejected(DEFAULT_REJECTION_MESSAGE.to_string()));

        let blank = LoginPayload {
            error: Some("  ".to_string()),
            ..Default::default()
        };
        let err = service(Ok(Some(blank))).login("a", "b").await.unwrap_err();
        assert_eq!(err, AuthError::Rejected(DEFAULT_REJECTION_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_login_transport_failure() {
        let unavailable = LoginService::new(Arc::new(InMemoryAuthGateway::new().unavailable()));
        let err = unavailable.login("mlopez", "s3cret").await.unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(ref m) if m.contains("connection refused")));

        let err = service(Err(GatewayError::Transport(String::new())))
            .login("a", "b")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Unavailable(DEFAULT_CONNECTION_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_login_success_without_token_is_malformed() {
        let payload = LoginPayload {
            success: true,
            user_id: Some(Uuid::new_v4()),
            username: Some("admin".to_string()),
            role: Some("ADMIN".to_string()),
            ..Default::default()
        };
        let err = service(Ok(Some(payload))).login("admin", "x").await.unwrap_err();
        assert_eq!(
            err,
            AuthError::MalformedResponse("missing session_token".to_string())
        );
    }

    #[tokio::test]
    async fn test_login_success_with_unknown_role_is_malformed() {
        let payload = LoginPayload {
            success: true,
            user_id: Some(Uuid::new_v4()),
            username: Some("disp".to_string()),
            role: Some("DISPATCHER".to_string()),
            session_token: Some("tok".to_string()),
            ..Default::default()
        };
        let err = service(Ok(Some(payload))).login("disp", "x").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(_)));
    }
}
