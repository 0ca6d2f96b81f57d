//! Move API endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use move_arbiter::Origin;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::AppState;

/// Label used for moves that did not come from the engine.
pub const RANDOM_LABEL: &str = "Random";

/// Body of a move request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Position in FEN notation.
    #[serde(default, alias = "position")]
    pub fen: Option<String>,
    /// Requested playing strength. Falls back to the configured default.
    #[serde(default, alias = "elo")]
    pub skill_rating: Option<i64>,
}

/// Move response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    /// Move in UCI notation.
    #[serde(rename = "move")]
    pub mv: String,
    /// The rating the move was chosen for.
    pub skill_rating: i64,
    pub origin: Origin,
    /// Engine name for engine moves, `"Random"` otherwise.
    pub engine: String,
    pub message: String,
}

/// POST /api/move
///
/// Chooses a move for the side to move in `fen`.
///
/// # Errors
/// * 400 Bad Request - missing or invalid FEN, or no legal moves
/// * 500 Internal Server Error - arbiter invariant broken
pub async fn propose_move(
    State(state): State<AppState>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<MoveResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadBody(e.body_text()))?;

    let fen = match request.fen {
        Some(fen) if !fen.is_empty() => fen,
        _ => return Err(ApiError::MissingFen),
    };
    let skill_rating = request.skill_rating.unwrap_or(state.default_skill_rating);

    let result = state.arbiter.propose_move(&fen, skill_rating).await?;

    let engine = match result.origin {
        Origin::Engine => state.engine.name().unwrap_or("UCI engine").to_string(),
        Origin::Fallback => RANDOM_LABEL.to_string(),
    };
    tracing::info!(
        mv = %result.mv,
        origin = %result.origin,
        skill_rating,
        "Move chosen"
    );

    Ok(Json(MoveResponse {
        message: format!("{} move (rating {})", engine, skill_rating),
        mv: result.mv,
        skill_rating,
        origin: result.origin,
        engine,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::{app, AppState};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use move_arbiter::{Arbiter, EngineConfig, UciEngine};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

    fn router() -> axum::Router {
        let engine = Arc::new(UciEngine::unstarted(&EngineConfig::default()));
        let arbiter = Arbiter::new(engine, StdRng::seed_from_u64(3));
        let config = HttpConfig {
            default_skill_rating: 1200,
            ..HttpConfig::default()
        };
        app(AppState::new(arbiter, config.default_skill_rating), &config)
    }

    async fn post(body: &str) -> (StatusCode, Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/move")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn engine_down_returns_random_legal_move() {
        let body = serde_json::json!({ "fen": START, "skillRating": 1800 }).to_string();
        let (status, json) = post(&body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["origin"], "fallback");
        assert_eq!(json["engine"], RANDOM_LABEL);
        assert_eq!(json["skillRating"], 1800);
        assert_eq!(json["move"].as_str().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn aliases_are_accepted() {
        let body = serde_json::json!({ "position": START, "elo": 900 }).to_string();
        let (status, json) = post(&body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["skillRating"], 900);
    }

    #[tokio::test]
    async fn missing_rating_uses_default() {
        let body = serde_json::json!({ "fen": START }).to_string();
        let (status, json) = post(&body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["skillRating"], 1200);
    }

    #[tokio::test]
    async fn missing_fen_is_bad_request() {
        let (status, json) = post(r#"{"skillRating": 1500}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "FEN position required");

        let (status, _) = post(r#"{"fen": ""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_fen_is_bad_request() {
        let (status, json) = post(r#"{"fen": "not-a-position"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid position"));
    }

    #[tokio::test]
    async fn checkmate_is_bad_request() {
        let body = serde_json::json!({ "fen": FOOLS_MATE }).to_string();
        let (status, json) = post(&body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No legal moves available");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (status, json) = post("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[test]
    fn response_serializes_camel_case() {
        let response = MoveResponse {
            mv: "e2e4".to_string(),
            skill_rating: 1500,
            origin: Origin::Engine,
            engine: "Stockfish 16".to_string(),
            message: "Stockfish 16 move (rating 1500)".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["move"], "e2e4");
        assert_eq!(json["skillRating"], 1500);
        assert_eq!(json["origin"], "engine");
    }
}
