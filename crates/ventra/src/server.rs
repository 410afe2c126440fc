// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::warn;

use ventra_config::model::ServerConfig;
use ventra_core::VentraError;

use crate::pipeline::Pipeline;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Build the application router.
pub fn app(config: &ServerConfig, pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route(&config.webhook_path, post(post_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pipeline })
}

/// Bind and serve until shutdown is signalled.
pub async fn start_server(config: &ServerConfig, pipeline: Arc<Pipeline>) -> Result<(), VentraError> {
    let app = app(config, pipeline);
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .map_err(|e| VentraError::Channel {
            message: format!("failed to bind to {}: {e}", config.bind_address),
            source: Some(Box::new(e)),
        })?;

    tracing::info!(address = %config.bind_address, path = %config.webhook_path,
        "webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| VentraError::Channel {
            message: format!("server error: {e}"),
            source: Some(Box::new(e)),
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install shutdown handler");
    }
}

async fn get_health() -> &'static str {
    "ok"
}

/// Accept a provider webhook.
///
/// `202 Accepted` means the payload was attributed and queued; batching
/// and processing continue after the response. Unattributable payloads
/// get `422` so a misconfigured provider shows up in its own logs.
async fn post_webhook(State(state): State<AppState>, Json(raw): Json<Value>) -> StatusCode {
    match state.pipeline.handle_webhook(raw).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(VentraError::UnknownProvider) => {
            warn!("webhook from unknown provider dropped");
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Err(e) => {
            warn!(error = %e, "webhook rejected");
            StatusCode::BAD_REQUEST
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use ventra_config::model::VentraConfig;
    use ventra_test_utils::evolution_text_webhook;

    async fn test_app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VentraConfig::default();
        config.storage.database_path = dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .into_owned();
        config.buffer.debounce_secs = 1;
        config.buffer.poll_interval_ms = 50;
        let pipeline = Pipeline::build(&config).await.unwrap();
        (app(&config.server, pipeline), dir)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_answers() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn recognized_webhook_is_accepted() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(post_json(
                "/webhook",
                evolution_text_webhook("5215550001111", "hola"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn unknown_payload_is_unprocessable() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(post_json(
                "/webhook",
                serde_json::json!({"hello": "world"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
