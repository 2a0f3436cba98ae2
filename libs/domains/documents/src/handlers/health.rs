//! Health check endpoint, backed by the store heartbeat

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::service::DocumentService;
use crate::store::DocumentStore;

/// Store-backed liveness probe. Never rejected by the auth gate.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Store reachable"),
        (status = 500, description = "Store unreachable")
    )
)]
pub async fn health<S: DocumentStore>(
    State(service): State<Arc<DocumentService<S>>>,
) -> Response {
    match service.heartbeat().await {
        Ok(heartbeat) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "heartbeat": heartbeat })),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "error": err.to_string() })),
        )
            .into_response(),
    }
}
