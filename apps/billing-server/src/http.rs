use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{body::Body, http::Request, routing::get, Router};
use billing::Billing;
use runtime::ServerConfig;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const BODY_LIMIT: usize = 16 * 1024 * 1024;

async fn healthz() -> &'static str {
    "ok"
}

/// Full application router with the global middleware stack.
pub fn build_router(billing: &Billing, cfg: &ServerConfig) -> Router {
    let timeout = match cfg.timeout_sec {
        0 => DEFAULT_TIMEOUT_SECS,
        n => n,
    };

    billing
        .register_rest(Router::new().route("/healthz", get(healthz)))
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri().path(),
                version = ?req.version(),
            )
        }))
        .layer(TimeoutLayer::new(Duration::from_secs(timeout)))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
}

/// Bind and serve until a shutdown signal arrives.
pub async fn serve(router: Router, cfg: &ServerConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .with_context(|| format!("Invalid bind address '{}:{}'", cfg.host, cfg.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("HTTP server bound on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = crate::shutdown::wait_for_shutdown().await {
                tracing::warn!("shutdown: signal listener failed: {e}");
            }
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .context("HTTP server failed")
}
