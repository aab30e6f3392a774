//! Repository implementations for database operations.

pub mod auth;
pub mod dashboard;
pub mod user;
pub mod work_order;

pub use auth::PgAuthGateway;
pub use dashboard::PgKpiDataSource;
pub use user::UserRepository;
pub use work_order::WorkOrderRepository;
