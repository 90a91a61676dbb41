//! Liveness and database health probe.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::dto::HealthResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.db {
        None => "not_configured".to_string(),
        Some(db) => {
            if db.is_healthy().await {
                "ok".to_string()
            } else {
                "unavailable".to_string()
            }
        }
    };

    let status = if database == "unavailable" {
        "degraded"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
