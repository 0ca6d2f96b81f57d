//! Request timing middleware.
//!
//! Logs the duration of each HTTP request. Move requests legitimately wait
//! for an engine search, so the slow threshold comes from configuration
//! rather than being fixed.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};

/// Requests slower than this duration are logged at `warn`.
#[derive(Debug, Clone, Copy)]
pub struct SlowThreshold(pub Duration);

/// Middleware that logs request timing.
///
/// # Example
///
/// ```ignore
/// use axum::{middleware, Router};
/// use move_server::middleware::{timing_layer, SlowThreshold};
///
/// let app = Router::new()
///     .route("/api/example", get(handler))
///     .layer(middleware::from_fn_with_state(
///         SlowThreshold(Duration::from_secs(6)),
///         timing_layer,
///     ));
/// ```
pub async fn timing_layer(
    State(SlowThreshold(threshold)): State<SlowThreshold>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();

    if duration > threshold {
        tracing::warn!(
            method = %method,
            path = %uri,
            status = status,
            duration_ms = duration.as_millis(),
            "Slow request"
        );
    } else {
        tracing::debug!(
            method = %method,
            path = %uri,
            status = status,
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}
