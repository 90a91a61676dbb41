//! Notification endpoints.
//!
//! Creation and listing hang off an incident; sending addresses the
//! notification row directly.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use bw_core::{Notification, NotificationWithSender};

use crate::dto::CreateNotificationRequest;
use crate::error::ApiError;
use crate::extract::ActorId;
use crate::state::AppState;

/// Routes nested under `/api/incidents`.
pub fn incident_routes() -> Router<AppState> {
    Router::new().route(
        "/:id/notifications",
        post(create_notification).get(list_notifications),
    )
}

/// Routes nested under `/api/notifications`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/:id/send", post(send_notification))
}

/// `POST /api/incidents/:id/notifications`
///
/// Stages a pending notification. The sender is recorded at send time,
/// not here.
async fn create_notification(
    State(state): State<AppState>,
    Path(incident_id): Path<i64>,
    Json(body): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let notification = state
        .notifications
        .create_notification(incident_id, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// `GET /api/incidents/:id/notifications`
async fn list_notifications(
    State(state): State<AppState>,
    Path(incident_id): Path<i64>,
) -> Result<Json<Vec<NotificationWithSender>>, ApiError> {
    let notifications = state.notifications.get_notifications(incident_id).await?;
    Ok(Json(notifications))
}

/// `POST /api/notifications/:id/send`
///
/// Renders and dispatches the notification. Delivery failures come back
/// as a `failed` row with 200, not as an error status.
async fn send_notification(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<i64>,
) -> Result<Json<Notification>, ApiError> {
    let notification = state.notifications.send_notification(id, actor).await?;
    Ok(Json(notification))
}
