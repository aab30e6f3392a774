//! Domain services for the FSM dashboard.
//!
//! Services contain business logic that operates on domain models.

pub mod data_source;
pub mod kpi_aggregator;
pub mod login;

pub use data_source::{InMemoryDataSource, KpiDataSource, SourceError};
pub use kpi_aggregator::{
    AggregationFailed, AggregatorSettings, KpiAggregator, KpiInputs, DEFAULT_FETCH_TIMEOUT,
};
pub use login::{AuthError, AuthGateway, GatewayError, InMemoryAuthGateway, LoginService};
