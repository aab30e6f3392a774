//! Domain layer for the FSM dashboard backend.
//!
//! This crate contains:
//! - Domain models (user and work-order records, KPI summary, sessions)
//! - The KPI aggregator and the login flow
//! - Traits for the external data source and authentication collaborators

pub mod models;
pub mod services;
