//! Shared utilities and common types for the FSM dashboard backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Injectable clock for time-dependent computations
//! - Cryptographic utilities (token hashing)
//! - Numeric rounding used by dashboard metrics
//! - Common validation logic

pub mod clock;
pub mod crypto;
pub mod rounding;
pub mod validation;
