//! Incident endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use bw_core::{Incident, IncidentPage};

use crate::dto::{CreateIncidentRequest, ListIncidentsQuery, UpdateStatusRequest};
use crate::error::ApiError;
use crate::extract::ActorId;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_incident).get(list_incidents))
        .route("/:id", get(get_incident))
        .route("/:id/status", patch(update_incident_status))
}

/// `POST /api/incidents`
///
/// Records the incident and, when alerting is enabled, fans an internal
/// alert out to the security distribution list.
async fn create_incident(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(body): Json<CreateIncidentRequest>,
) -> Result<(StatusCode, Json<Incident>), ApiError> {
    let incident = state.incidents.create_incident(body.into(), actor).await?;
    Ok((StatusCode::CREATED, Json(incident)))
}

/// `GET /api/incidents`
async fn list_incidents(
    State(state): State<AppState>,
    Query(query): Query<ListIncidentsQuery>,
) -> Result<Json<IncidentPage>, ApiError> {
    let page = state
        .incidents
        .list_incidents(query.filter(), query.pagination())
        .await?;
    Ok(Json(page))
}

/// `GET /api/incidents/:id`
async fn get_incident(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Incident>, ApiError> {
    let incident = state.incidents.get_incident(id).await?;
    Ok(Json(incident))
}

/// `PATCH /api/incidents/:id/status`
async fn update_incident_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Incident>, ApiError> {
    let incident = state
        .incidents
        .update_incident_status(id, &body.status)
        .await?;
    Ok(Json(incident))
}
