use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use cmdrelay_cli::http::{build_app, AppState};
use cmdrelay_core::api::{
    AppConfig, CommandSpec, ProcessEvent, ProcessLauncher, SubprocessHandle, TokioLauncher,
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

const KEY: &str = "test-secret";

fn config(command: Option<&str>) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.command.line = command.map(str::to_string);
    cfg.http_server.api_key = Some(KEY.to_string());
    cfg
}

fn app(cfg: AppConfig) -> Router {
    build_app(AppState::new(cfg, Arc::new(TokioLauncher::new())))
}

/// Counts launches and finishes every run with exit code 0.
#[derive(Default)]
struct CountingLauncher {
    launches: AtomicUsize,
}

impl ProcessLauncher for CountingLauncher {
    fn name(&self) -> &str {
        "counting"
    }

    fn launch(&self, _spec: &CommandSpec) -> SubprocessHandle {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let (tx, handle) = SubprocessHandle::channel(1);
        tokio::spawn(async move {
            let _ = tx.send(ProcessEvent::Exited(0)).await;
        });
        handle
    }
}

fn trigger_request(key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/api/trigger");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}

#[tokio::test]
async fn health_needs_no_key() {
    let resp = app(config(None))
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(
        resp.headers().get("strict-transport-security").unwrap(),
        "max-age=31536000; includeSubDomains"
    );
    assert!(resp
        .headers()
        .get("content-security-policy")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("default-src 'self'"));
    assert_eq!(body_json(resp).await, serde_json::json!({"status": "healthy"}));
}

#[tokio::test]
async fn missing_key_is_unauthorized() {
    let resp = app(config(Some("echo hello")))
        .oneshot(trigger_request(None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await, serde_json::json!({"error": "Unauthorized"}));
}

#[tokio::test]
async fn wrong_key_is_unauthorized() {
    let resp = app(config(Some("echo hello")))
        .oneshot(trigger_request(Some("nope")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unset_server_key_rejects_everyone() {
    let mut cfg = config(Some("echo hello"));
    cfg.http_server.api_key = None;
    let resp = app(cfg).oneshot(trigger_request(Some(""))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejected_key_never_reaches_the_launcher() {
    let launcher = Arc::new(CountingLauncher::default());
    let app = build_app(AppState::new(config(Some("echo hello")), launcher.clone()));

    for key in [None, Some("nope"), Some("")] {
        let resp = app.clone().oneshot(trigger_request(key)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);

    let resp = app.oneshot(trigger_request(Some(KEY))).await.unwrap();
    assert_eq!(
        body_text(resp).await,
        "data: Command completed with code 0\n\n"
    );
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unconfigured_command_is_json_500() {
    let resp = app(config(None))
        .oneshot(trigger_request(Some(KEY)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(
        body_json(resp).await,
        serde_json::json!({"success": false, "error": "CLI command not configured"})
    );
}

#[cfg(unix)]
#[tokio::test]
async fn echo_streams_output_then_completion() {
    let resp = app(config(Some("echo hello")))
        .oneshot(trigger_request(Some(KEY)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-cache");
    assert_eq!(
        body_text(resp).await,
        "data: hello\n\ndata: Command completed with code 0\n\n"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn exit_code_is_reported() {
    let mut cfg = config(Some("echo done; exit 4"));
    cfg.command.shell = true;
    let resp = app(cfg).oneshot(trigger_request(Some(KEY))).await.unwrap();

    assert_eq!(
        body_text(resp).await,
        "data: done\n\ndata: Command completed with code 4\n\n"
    );
}

#[tokio::test]
async fn missing_binary_streams_single_error() {
    let resp = app(config(Some("cmdrelay-no-such-binary --flag")))
        .oneshot(trigger_request(Some(KEY)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let text = body_text(resp).await;
    assert!(text.starts_with("data: Error: "), "{text}");
    assert!(text.contains("cmdrelay-no-such-binary"), "{text}");
    assert!(!text.contains("Command completed"), "{text}");
    assert_eq!(text.matches("\n\n").count(), 1, "{text}");
}

#[tokio::test]
async fn rate_limit_rejects_over_quota() {
    let mut cfg = config(None);
    cfg.http_server.rate_limit.max_requests = 2;
    let app = app(cfg);

    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body_json(resp).await,
        serde_json::json!({"error": "Too many requests, please try again later."})
    );
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let resp = app(config(None))
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/trigger")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "x-api-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:3000"
    );
}
