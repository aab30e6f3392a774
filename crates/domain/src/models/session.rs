//! Login and session domain models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRole;

/// The signed-in user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub full_name: Option<String>,
}

impl AuthenticatedUser {
    /// Name used to greet the user: full name when known, username otherwise.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

/// Raw payload returned by the backend's `login_with_username` RPC.
///
/// Every field is optional on the wire; a failed login typically carries
/// only `success = false` and an `error` message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A session established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub session_token: String,
    pub user: AuthenticatedUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(full_name: Option<&str>) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            username: "jperez".to_string(),
            role: UserRole::Technician,
            full_name: full_name.map(str::to_string),
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(user(Some("Juan Pérez")).display_name(), "Juan Pérez");
        assert_eq!(user(None).display_name(), "jperez");
        assert_eq!(user(Some("  ")).display_name(), "jperez");
    }

    #[test]
    fn test_login_payload_failure_shape() {
        let payload: LoginPayload =
            serde_json::from_str(r#"{"success": false, "error": "Usuario inactivo"}"#).unwrap();
        assert!(!payload.success);
        assert_eq!(payload.error.as_deref(), Some("Usuario inactivo"));
        assert!(payload.session_token.is_none());
    }

    #[test]
    fn test_login_payload_success_shape() {
        let json = r#"{
            "success": true,
            "user_id": "550e8400-e29b-41d4-a716-446655440000",
            "username": "admin",
            "role": "ADMIN",
            "full_name": "Site Admin",
            "session_token": "tok_123"
        }"#;
        let payload: LoginPayload = serde_json::from_str(json).unwrap();
        assert!(payload.success);
        assert_eq!(payload.role.as_deref(), Some("ADMIN"));
        assert_eq!(payload.session_token.as_deref(), Some("tok_123"));
        assert!(payload.error.is_none());
    }

    #[test]
    fn test_authenticated_user_serializes_camel_case() {
        let json = serde_json::to_value(user(Some("Juan"))).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("fullName").is_some());
        assert_eq!(json["role"], "TECHNICIAN");
    }
}
