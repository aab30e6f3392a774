//! HTTP route handlers.

pub mod auth;
pub mod dashboard;
pub mod health;
