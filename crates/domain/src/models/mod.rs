//! Domain models for the FSM dashboard.

pub mod kpi;
pub mod session;
pub mod user;
pub mod work_order;

pub use kpi::{DashboardSnapshot, KpiSection, KpiSummary, DEFAULT_WINDOW_DAYS};
pub use session::{AuthenticatedUser, LoginPayload, LoginSuccess};
pub use user::{UserRecord, UserRole};
pub use work_order::{CompletedWorkRecord, WorkOrderRecord, STATUS_COMPLETED, STATUS_HIGH_PRIORITY};
