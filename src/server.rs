use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use crate::scan::{ScanEngine, ScanResult};

pub const SCAN_PATH: &str = "/post-on-ping";
const RUNNING_MESSAGE: &str = "Polymarket Alert Bot is running.";

#[derive(Debug, Serialize)]
struct ScanResponse {
    status: &'static str,
    #[serde(flatten)]
    result: ScanResult,
}

/// `POST /post-on-ping` runs a scan, `GET /` is the liveness check, everything
/// else (including other methods on those paths) is a 404.
pub fn router(engine: Arc<ScanEngine>) -> Router {
    Router::new()
        .route("/", get(running).fallback(not_found))
        .route(SCAN_PATH, post(trigger_scan).fallback(not_found))
        .fallback(not_found)
        .with_state(engine)
}

async fn running() -> &'static str {
    RUNNING_MESSAGE
}

async fn trigger_scan(State(engine): State<Arc<ScanEngine>>) -> Json<ScanResponse> {
    let result = engine.run_scan("http").await;
    Json(ScanResponse { status: "scan complete", result })
}

async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}

pub async fn serve(engine: Arc<ScanEngine>, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Server running on port {}", port);

    axum::serve(listener, router(engine))
        .await
        .context("HTTP server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BotConfig;
    use crate::scan::testing::{RecordingSink, StaticTrades};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    fn app() -> Router {
        let engine = ScanEngine::new(
            &BotConfig::default(),
            Box::new(StaticTrades::new(Vec::new())),
            None,
            Box::new(RecordingSink::default()),
        );
        router(Arc::new(engine))
    }

    async fn call(method: Method, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_liveness() {
        let (status, body) = call(Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, RUNNING_MESSAGE);
    }

    #[tokio::test]
    async fn test_trigger_runs_a_scan() {
        let (status, body) = call(Method::POST, SCAN_PATH).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "scan complete");
        // empty feed: only the heartbeat goes out
        assert_eq!(json["alerts"], 1);
        assert_eq!(json["alerts_sent"], 1);
    }

    #[tokio::test]
    async fn test_unknown_routes_and_methods_are_not_found() {
        assert_eq!(call(Method::GET, "/nope").await.0, StatusCode::NOT_FOUND);
        assert_eq!(call(Method::GET, SCAN_PATH).await.0, StatusCode::NOT_FOUND);
        assert_eq!(call(Method::POST, "/").await.0, StatusCode::NOT_FOUND);
    }
}
