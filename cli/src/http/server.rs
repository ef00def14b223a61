//! HTTP server lifecycle

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use cmdrelay_core::api::{AppConfig, CliError, TokioLauncher};
use tokio::signal;
use tracing::{info, warn};

use super::{
    middleware::{
        create_cors_layer, create_timeout_layer, rate_limit, request_logger,
        security_header_layers,
    },
    routes::create_router,
    AppState,
};

/// Routes plus the full middleware stack.
pub fn build_app(state: AppState) -> Router {
    let http_cfg = state.config.http_server.clone();

    let mut app = create_router(state.clone())
        .layer(middleware::from_fn_with_state(state, rate_limit));
    for layer in security_header_layers() {
        app = app.layer(layer);
    }
    app.layer(create_cors_layer(&http_cfg.allowed_origins))
        .layer(create_timeout_layer(http_cfg.request_timeout_secs))
        .layer(middleware::from_fn(request_logger))
}

/// Serves until Ctrl+C or SIGTERM.
pub async fn start_server(config: AppConfig) -> Result<(), CliError> {
    let host = config.http_server.host.clone();
    let port = config.http_server.port;

    if config.command.line.is_none() {
        warn!("no command configured; triggers will fail until CLI_COMMAND is set");
    }
    if config.http_server.api_key.is_none() {
        warn!("no API key configured; every trigger request will be rejected");
    }

    let state = AppState::new(config, Arc::new(TokioLauncher::new()));
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| CliError::Server(format!("failed to bind {host}:{port}: {e}")))?;

    info!("Server running at http://{}:{}", host, port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C signal");
            }
            _ = wait_for_sigterm() => {
                info!("Received SIGTERM signal");
            }
        }
        info!("Starting graceful shutdown...");
    })
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// No SIGTERM on Windows; Ctrl+C still stops the server.
#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
