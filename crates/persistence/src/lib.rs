//! Persistence layer for the FSM dashboard backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - Postgres-backed implementations of the domain's data source and
//!   authentication gateway

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
