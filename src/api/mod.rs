// HTTP API: router, shared state, and operational endpoints.

pub mod coach;
pub mod zones;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::decision::ReasoningMode;
use crate::error::ApiError;
use crate::llm::ChatModel;
use crate::metrics;

// ── Shared application state ─────────────────────────────────────────

/// Built once at startup. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    /// Shared model client; `None` when no API key is configured.
    pub model: Option<Arc<dyn ChatModel>>,
    pub zone_reasoning: ReasoningMode,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn ChatModel>>, zone_reasoning: ReasoningMode) -> Self {
        Self {
            model,
            zone_reasoning,
        }
    }

    pub fn model(&self) -> Option<&dyn ChatModel> {
        self.model.as_deref()
    }
}

// ── Router ────────────────────────────────────────────────────────────

/// Routes only, without CORS or request tracking.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/llms.txt", get(get_llms_txt))
        .route("/ai-coach", post(coach::ai_coach))
        .route("/zone-decision", post(zones::zone_decision))
        .fallback(not_found)
        .with_state(state)
}

/// Metric label for requests that hit no route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Full application: routes plus CORS, HTTP tracing and request tracking.
pub fn app(state: AppState, cors_origins: Option<&[String]>) -> Router {
    router(state)
        .layer(middleware::from_fn(track_requests))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Permissive CORS unless an origin allow-list is given.
pub fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let origins = match origins {
        Some(origins) if !origins.iter().any(|o| o == "*") => origins,
        _ => return CorsLayer::permissive(),
    };
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {o:?}");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Tag each request with an id, log it, and record metrics.
async fn track_requests(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());
    let request_id = Uuid::new_v4();

    let span = tracing::info_span!(
        "http_request",
        method = %method,
        path = %endpoint,
        request_id = %request_id,
    );

    let mut response = next.run(req).instrument(span.clone()).await;

    let status = response.status();
    let elapsed = started.elapsed();
    metrics::API_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint.as_str(), status.as_str()])
        .inc();
    metrics::API_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint.as_str()])
        .observe(elapsed.as_secs_f64());
    span.in_scope(|| {
        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

// ── Operational handlers ──────────────────────────────────────────────

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics::gather_metrics(),
    )
}

async fn get_llms_txt() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        crate::llms_txt::LLMS_TXT,
    )
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
