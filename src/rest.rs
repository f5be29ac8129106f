//! HTTP request boundary.
//!
//! Thin axum layer over the engine: `/search` runs one discovery under an
//! end-to-end deadline, `/health` answers regardless of whether a browser
//! is even installed. Engine outcomes map to transport responses here;
//! nothing engine-shaped leaks past this module.

use crate::engine::{DiscoveryError, PriceEngine};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Default listen port (overridable via `PORT`).
pub const DEFAULT_PORT: u16 = 3000;

/// End-to-end deadline for one `/search` request.
pub const DEFAULT_DEADLINE_MS: u64 = 25_000;

/// Wrapper to assert a future is Send.
///
/// The discovery future contains only Send types but the compiler cannot
/// prove it due to higher-ranked lifetime bounds in chromiumoxide's
/// transitive dependencies. All concrete session state (Arc, String,
/// Page) is Send, so the assertion is sound.
struct AssertSend<F>(F);

// SAFETY: all concrete types inside the discovery future are Send; only
// the compiler's conservative HRTB analysis says otherwise.
unsafe impl<F: std::future::Future> Send for AssertSend<F> {}

impl<F: std::future::Future> std::future::Future for AssertSend<F> {
    type Output = F::Output;
    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        let inner = unsafe { self.map_unchecked_mut(|s| &mut s.0) };
        inner.poll(cx)
    }
}

/// Shared state for the boundary handlers.
pub struct BoundaryState {
    engine: Arc<PriceEngine>,
    deadline_ms: u64,
}

impl BoundaryState {
    pub fn new(engine: Arc<PriceEngine>) -> Self {
        let deadline_ms = std::env::var("FERREPRECIO_DEADLINE_MS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_DEADLINE_MS);
        Self::with_deadline(engine, deadline_ms)
    }

    pub fn with_deadline(engine: Arc<PriceEngine>, deadline_ms: u64) -> Self {
        Self { engine, deadline_ms }
    }
}

/// Build the axum Router with all boundary endpoints.
pub fn router(state: Arc<BoundaryState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/search", get(search))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve on `0.0.0.0:port`.
pub async fn serve(port: u16, engine: Arc<PriceEngine>) -> anyhow::Result<()> {
    let app = router(Arc::new(BoundaryState::new(engine)));
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> &'static str {
    "OK. Usa /health o /search?q=2144208 (o /search?id=...)."
}

/// Liveness, independent of the engine.
async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

#[derive(serde::Deserialize, Default)]
struct SearchParams {
    id: Option<String>,
    q: Option<String>,
}

async fn search(
    State(state): State<Arc<BoundaryState>>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<Value>) {
    let query = params
        .id
        .or(params.q)
        .unwrap_or_default()
        .trim()
        .to_string();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Falta id o q" })),
        );
    }

    info!(query = %query, "GET /search");
    let deadline_ms = state.deadline_ms;
    let engine = Arc::clone(&state.engine);

    // Spawned so the run keeps driving toward its own scoped session
    // release even after the boundary deadline gives up on the response.
    let task = tokio::task::spawn(AssertSend(async move {
        engine.discover(&query).await
    }));

    match tokio::time::timeout(Duration::from_millis(deadline_ms), task).await {
        Err(_) => {
            error!(deadline_ms, "discovery exceeded the request deadline");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Timeout",
                    "details": format!("engine did not answer within {deadline_ms}ms"),
                })),
            )
        }
        Ok(Err(join_err)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Scrape failed",
                "details": format!("task panicked: {join_err}"),
            })),
        ),
        Ok(Ok(Ok(result))) => (StatusCode::OK, Json(result.to_json())),
        Ok(Ok(Err(e))) => {
            error!(error = %e, "discovery failed");
            let status = match e {
                DiscoveryError::EmptyQuery => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(json!({ "error": "Scrape failed", "details": e.to_string() })),
            )
        }
    }
}
