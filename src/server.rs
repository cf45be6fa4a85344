use std::sync::Arc;

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::{
    cache::ScanCache,
    service::ScanService,
    types::{ScanEnvelope, ScanProfile, ScanResult},
};

/// Shared handler state. The cache and service are constructed once at
/// startup and injected, so tests can build isolated instances.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ScanCache>,
    pub service: Arc<ScanService>,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub target: String,
    #[serde(default = "default_scan_type")]
    pub scan_type: String,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_scan_type() -> String {
    "basic".to_string()
}

fn default_use_cache() -> bool {
    true
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/scan", post(post_scan))
        .route("/cache/clear", post(post_cache_clear))
        .with_state(state);

    let static_svc = ServeDir::new("ui").append_index_html_on_directories(true);

    Router::new()
        .nest("/api", api)
        .fallback_service(static_svc)
        .layer(TraceLayer::new_for_http())
}

pub async fn spawn_server(bind: &str, state: AppState) -> Result<()> {
    let app = router(state);
    tracing::info!(bind, "serving UI");
    println!("Serving UI on http://{}", bind);
    axum::serve(tokio::net::TcpListener::bind(bind).await?, app).await?;
    Ok(())
}

/// Scan-trigger logic behind `POST /api/scan`, kept free of axum types so it
/// can be exercised directly in tests.
pub async fn handle_scan(state: &AppState, req: ScanRequest) -> ScanEnvelope {
    let profile = ScanProfile::from_token(&req.scan_type);
    let service = state.service.clone();
    let target = req.target.clone();

    let (mut envelope, was_cached) = state
        .cache
        .get_or_compute(&req.target, profile, req.use_cache, move || async move {
            service.perform_scan(&target, profile).await
        })
        .await;

    if was_cached {
        envelope.message = format!("Results from cache. {}", envelope.message);
    }
    envelope
}

/// Cache-invalidation logic behind `POST /api/cache/clear`.
pub fn handle_cache_clear(state: &AppState) -> ScanEnvelope {
    state.cache.clear();
    tracing::info!("scan cache cleared");
    ScanEnvelope::success("Cache cleared", ScanResult::default())
}

async fn post_scan(State(app): State<AppState>, Json(req): Json<ScanRequest>) -> impl IntoResponse {
    // Errors travel inside the envelope; the HTTP status stays 200.
    let envelope = handle_scan(&app, req).await;
    (StatusCode::OK, Json(envelope))
}

async fn post_cache_clear(State(app): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(handle_cache_clear(&app)))
}
