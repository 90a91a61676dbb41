//! Remediation endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};

use bw_core::{Remediation, RemediationWithActor};

use crate::dto::RemediationRequest;
use crate::error::ApiError;
use crate::extract::ActorId;
use crate::state::AppState;

/// Routes nested under `/api/incidents`.
pub fn incident_routes() -> Router<AppState> {
    Router::new().route(
        "/:id/remediations",
        post(add_remediation).get(list_remediations),
    )
}

/// Routes nested under `/api/remediations`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/:id", patch(update_remediation))
}

/// `POST /api/incidents/:id/remediations`
async fn add_remediation(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(incident_id): Path<i64>,
    Json(body): Json<RemediationRequest>,
) -> Result<(StatusCode, Json<Remediation>), ApiError> {
    let remediation = state
        .remediations
        .add_remediation(incident_id, body.into(), actor)
        .await?;
    Ok((StatusCode::CREATED, Json(remediation)))
}

/// `GET /api/incidents/:id/remediations`
async fn list_remediations(
    State(state): State<AppState>,
    Path(incident_id): Path<i64>,
) -> Result<Json<Vec<RemediationWithActor>>, ApiError> {
    let remediations = state.remediations.get_remediations(incident_id).await?;
    Ok(Json(remediations))
}

/// `PATCH /api/remediations/:id`
///
/// Overwrites the row and restamps `taken_at`. Omitted optional fields
/// are cleared, not preserved.
async fn update_remediation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<RemediationRequest>,
) -> Result<Json<Remediation>, ApiError> {
    let remediation = state.remediations.update_remediation(id, body.into()).await?;
    Ok(Json(remediation))
}
