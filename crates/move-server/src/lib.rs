//! Move Server Library
//!
//! HTTP routes, configuration and middleware for the move server. The
//! binary in `main.rs` wires these to a real engine process.

pub mod api;
pub mod config;
pub mod middleware;

use axum::routing::{get, post};
use axum::Router;
use config::HttpConfig;
use middleware::{timing_layer, SlowThreshold};
use move_arbiter::{Arbiter, UciEngine};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Chooses moves, consulting the shared engine.
    pub arbiter: Arc<Arbiter<Arc<UciEngine>>>,
    /// The same engine, for health reporting.
    pub engine: Arc<UciEngine>,
    /// Rating used when a request omits one.
    pub default_skill_rating: i64,
}

impl AppState {
    pub fn new(arbiter: Arbiter<Arc<UciEngine>>, default_skill_rating: i64) -> Self {
        let engine = Arc::clone(arbiter.search());
        Self {
            arbiter: Arc::new(arbiter),
            engine,
            default_skill_rating,
        }
    }
}

/// Builds the router: API routes, request timing, CORS, and static files
/// for everything else.
pub fn app(state: AppState, config: &HttpConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/move", post(api::moves::propose_move))
        .route("/api/health", get(api::health::health))
        .with_state(state)
        .fallback_service(ServeDir::new(&config.static_dir).append_index_html_on_directories(true))
        .layer(axum::middleware::from_fn_with_state(
            SlowThreshold(config.slow_request()),
            timing_layer,
        ))
        .layer(cors)
}
