//! API-key authentication middleware

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_helpers::AppError;

/// Stateless per-request credential check.
///
/// The key is read from the `x-api-key` header or from a bearer value in the
/// standard authorization header and compared against the configured secret.
/// Anything else is rejected before any store call happens. The health route
/// is mounted outside this layer.
pub async fn require_api_key(
    State(expected): State<Arc<String>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = {
        let headers = request.headers();
        let provided = headers
            .get("x-api-key")
            .and_then(|value| value.to_str().ok())
            .or_else(|| {
                headers
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "))
            });

        provided.is_some_and(|key| key == expected.as_str())
    };

    if authorized {
        next.run(request).await
    } else {
        AppError::Unauthorized("Invalid or missing API key".to_string()).into_response()
    }
}
