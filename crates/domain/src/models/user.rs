//! User domain models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Technician,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Technician => "TECHNICIAN",
        }
    }

    /// Human-readable role label shown next to the user's name.
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "Administrator",
            UserRole::Technician => "Technician",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(UserRole::Admin),
            "TECHNICIAN" => Ok(UserRole::Technician),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The part of a user row the dashboard looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserRecord {
    pub role: UserRole,
    pub is_active: bool,
}

impl UserRecord {
    /// Whether this user counts as an active technician.
    pub fn is_active_technician(&self) -> bool {
        self.role == UserRole::Technician && self.is_active
    }
}
