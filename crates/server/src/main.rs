use std::{any::Any, net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use axum::{
    extract::Request,
    http::{header, Extensions, HeaderMap, HeaderValue, StatusCode, Version},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shared::{
    error::ApiError,
    protocol::{health_route, submit_lead_route, submit_order_route},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::{
        predicate::{Predicate, SizeAbove},
        CompressionLayer,
    },
    services::{ServeDir, ServeFile},
    CompressionLevel,
};
use tracing::{error, info};

mod api;
mod app_state;
mod config;
mod notify;

use app_state::AppState;
use config::load_settings;
use notify::notifier_from_settings;

const STATIC_CACHE_CONTROL: &str = "public, max-age=31536000";
const PAGE_CACHE_CONTROL: &str = "no-cache, must-revalidate";
const COMPRESS_MIN_BYTES: u16 = 500;
const COMPRESS_LEVEL: i32 = 6;
const COMPRESS_MIME_TYPES: [&str; 5] = [
    "text/html",
    "text/css",
    "text/xml",
    "application/json",
    "application/javascript",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let notifier = notifier_from_settings(&settings)?;
    let telegram_configured = notifier.is_configured();

    let state = AppState { notifier };
    let app = build_router(Arc::new(state), &settings.site_root);

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(
        %addr,
        site_root = %settings.site_root.display(),
        telegram_configured,
        "order landing server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, site_root: &Path) -> Router {
    Router::new()
        .route(health_route(), get(api::health))
        .route(submit_order_route(), post(api::submit_order))
        .route(submit_lead_route(), post(api::submit_lead))
        .route_service("/", ServeFile::new(site_root.join("index.html")))
        .nest_service("/static", ServeDir::new(site_root.join("static")))
        .fallback(api::not_found)
        .with_state(state)
        .layer(middleware::from_fn(cache_headers))
        .layer(
            CompressionLayer::new()
                .quality(CompressionLevel::Precise(COMPRESS_LEVEL))
                .compress_when(SizeAbove::new(COMPRESS_MIN_BYTES).and(compressible_content_type)),
        )
        .layer(CatchPanicLayer::custom(panic_response))
}

/// Only text-like bodies are gzipped; images and other binary assets are sent
/// as they are.
fn compressible_content_type(
    _status: StatusCode,
    _version: Version,
    headers: &HeaderMap,
    _extensions: &Extensions,
) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|essence| essence.trim().to_ascii_lowercase())
        .is_some_and(|essence| COMPRESS_MIME_TYPES.contains(&essence.as_str()))
}

fn cache_control_for(path: &str) -> Option<&'static str> {
    if path.contains("static") {
        Some(STATIC_CACHE_CONTROL)
    } else if path == "/" || path.ends_with(".html") {
        Some(PAGE_CACHE_CONTROL)
    } else {
        None
    }
}

async fn cache_headers(request: Request, next: Next) -> Response {
    let cache_control = cache_control_for(request.uri().path());
    let mut response = next.run(request).await;
    if let Some(value) = cache_control {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static(value));
    }
    response
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    error!(%detail, "request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::internal("server error, try again later")),
    )
        .into_response()
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
