//! HTTP routes for the breach workflow API.

pub mod health;
pub mod incidents;
pub mod notifications;
pub mod remediations;

use axum::Router;

use crate::state::AppState;

/// Assembles the full application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/incidents", incident_routes())
        .nest("/api/notifications", notifications::routes())
        .nest("/api/remediations", remediations::routes())
        .merge(health::routes())
        .with_state(state)
}

/// Routes under `/api/incidents`, including the notification and
/// remediation collections nested below an incident.
fn incident_routes() -> Router<AppState> {
    incidents::routes()
        .merge(notifications::incident_routes())
        .merge(remediations::incident_routes())
}
