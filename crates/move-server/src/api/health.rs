//! Health endpoint.

use axum::extract::State;
use axum::Json;
use move_arbiter::EngineState;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    /// Lifecycle state of the search process.
    pub engine: EngineState,
    /// Name the engine reported during the handshake.
    pub engine_name: Option<String>,
}

/// GET /api/health
///
/// Always `"ok"` while the server is up; moves are still served with a
/// dead engine, just randomly.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        engine: state.engine.state(),
        engine_name: state.engine.name().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use crate::config::HttpConfig;
    use crate::{app, AppState};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use move_arbiter::{Arbiter, EngineConfig, UciEngine};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Value;
    use std::sync::Arc;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tower::ServiceExt;

    async fn get_health(engine: Arc<UciEngine>) -> (StatusCode, Value) {
        let arbiter = Arbiter::new(engine, StdRng::seed_from_u64(0));
        let config = HttpConfig::default();
        let response = app(AppState::new(arbiter, 1500), &config)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn reports_unstarted_engine() {
        let engine = Arc::new(UciEngine::unstarted(&EngineConfig::default()));
        let (status, json) = get_health(engine).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["engine"], "unstarted");
        assert!(json["engineName"].is_null());
    }

    /// Answers the handshake and nothing else.
    async fn handshake_only() -> Arc<UciEngine> {
        let (ours, theirs) = tokio::io::duplex(4096);
        let (their_read, mut their_write) = tokio::io::split(theirs);
        tokio::spawn(async move {
            let mut lines = BufReader::new(their_read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let reply = match line.as_str() {
                    "uci" => "id name Tester 2.0\nuciok\n",
                    "isready" => "readyok\n",
                    _ => continue,
                };
                if their_write.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
        });
        let (reader, writer) = tokio::io::split(ours);
        Arc::new(
            UciEngine::connect(reader, writer, &EngineConfig::default())
                .await
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn reports_running_engine_and_name() {
        let (status, json) = get_health(handshake_only().await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["engine"], "running");
        assert_eq!(json["engineName"], "Tester 2.0");
    }

    #[tokio::test]
    async fn reports_dead_engine_after_shutdown() {
        let engine = handshake_only().await;
        engine.shutdown().await;
        let (status, json) = get_health(engine).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["engine"], "dead");
    }
}
