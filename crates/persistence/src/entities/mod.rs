//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod work_order;

pub use work_order::{CompletedWorkEntity, WorkStatusEntity};
