use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Bounds every request by `limit`; an elapsed deadline becomes a `Timeout` error.
pub async fn timeout_middleware(
    State(limit): State<Duration>,
    req: Request<Body>,
    next: Next<Body>,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(
                method = %method,
                uri = %uri,
                timeout_ms = limit.as_millis() as u64,
                "Request deadline elapsed"
            );
            AppError::Timeout(format!("request exceeded {}ms", limit.as_millis())).into_response()
        }
    }
}
