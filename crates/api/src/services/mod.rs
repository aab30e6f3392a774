//! Service-local state shared across requests.

pub mod session_store;

pub use session_store::{SessionContext, SessionStore};
