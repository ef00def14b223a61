//! HTTP route handlers

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use cmdrelay_core::api::{SseBody, SSE_HEADERS};
use tracing::{error, info};

use super::{
    middleware::require_api_key,
    models::{HealthResponse, HttpServerError},
    state::AppState,
};

/// Builds every route
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/trigger", post(trigger_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .merge(protected)
        .route("/health", get(health_handler))
        .with_state(state)
}

/// POST /api/trigger - run the configured command and stream its output
async fn trigger_handler(State(state): State<AppState>) -> Result<Response, HttpServerError> {
    info!("Received trigger request");

    let session = state.trigger.trigger().map_err(|e| {
        error!("Error executing command: {e}");
        HttpServerError::from(e)
    })?;
    info!(run_id = %session.run_id, "streaming command output");

    // The run task is detached; it finishes on its own when the process exits.
    Ok(event_stream_response(session.body))
}

/// Wraps a session body into a 200 `text/event-stream` response.
pub fn event_stream_response(body: SseBody) -> Response {
    let stream = async_stream::stream! {
        let mut body = body;
        while let Some(frame) = body.next_frame().await {
            yield Ok::<Bytes, Infallible>(frame);
        }
    };

    let mut resp = Response::new(Body::from_stream(stream));
    *resp.status_mut() = StatusCode::OK;
    let headers = resp.headers_mut();
    for (name, value) in SSE_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    resp
}

/// GET /health - liveness check
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
    })
}
