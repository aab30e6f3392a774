//! Dashboard KPI routes.

use axum::{extract::State, Extension, Json};
use domain::models::{AuthenticatedUser, DashboardSnapshot};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_aggregation_failure, record_kpi_section_defaulted};
use crate::services::SessionContext;

/// Who the dashboard is being shown to.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerResponse {
    pub username: String,
    pub full_name: Option<String>,
    pub display_name: String,
    pub role: String,
    pub role_label: String,
}

impl From<&AuthenticatedUser> for ViewerResponse {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            display_name: user.display_name().to_string(),
            role: user.role.as_str().to_string(),
            role_label: user.role.label().to_string(),
        }
    }
}

/// KPI summary plus the viewer it was computed for.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub viewer: ViewerResponse,
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot,
}

/// Compute the dashboard KPIs.
///
/// GET /api/v1/dashboard/kpis
///
/// Sections whose fetch failed are reported with their default value and
/// listed in `degraded_sections`; a backend outage fails the whole request.
pub async fn get_kpis(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let snapshot = state.aggregator.compute_snapshot().await.map_err(|err| {
        record_aggregation_failure(err.section);
        ApiError::from(err)
    })?;

    for section in &snapshot.degraded_sections {
        record_kpi_section_defaulted(*section);
    }

    tracing::debug!(
        username = %session.user.username,
        degraded = snapshot.degraded_sections.len(),
        "Dashboard KPIs served"
    );

    Ok(Json(DashboardResponse {
        viewer: ViewerResponse::from(&session.user),
        snapshot,
    }))
}
