//! API handlers for the move server.

pub mod health;
pub mod moves;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use move_arbiter::ArbiterError;
use serde_json::json;
use thiserror::Error;

/// Errors returned to HTTP clients as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("FEN position required")]
    MissingFen,
    #[error("Invalid request body: {0}")]
    BadBody(String),
    #[error(transparent)]
    Arbiter(#[from] ArbiterError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFen | ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Arbiter(ArbiterError::InvalidPosition(_) | ArbiterError::NoLegalMoves) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Arbiter(ArbiterError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
