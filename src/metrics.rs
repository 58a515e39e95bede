// Prometheus metrics definitions for the FitZone backend.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("fitzone_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    /// Language-model calls, by purpose (coach, reasoning) and outcome (ok, error).
    pub static ref LLM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("fitzone_llm_requests_total", "Total language-model calls"),
        &["purpose", "outcome"],
    )
    .unwrap();

    /// Zone decisions served, by where the reason came from (template, llm, fallback).
    pub static ref ZONE_DECISIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("fitzone_zone_decisions_total", "Zone decisions served"),
        &["reasoning"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "fitzone_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0, 15.0]),
        &["endpoint"],
    )
    .unwrap();

    /// Language-model call latency in seconds, by purpose.
    pub static ref LLM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "fitzone_llm_request_duration_seconds",
            "Language-model call latency in seconds",
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 15.0, 30.0]),
        &["purpose"],
    )
    .unwrap();

    /// Number of candidate zones per decision request.
    pub static ref ZONE_CANDIDATES: Histogram = Histogram::with_opts(
        HistogramOpts::new("fitzone_zone_candidates", "Candidate zones per decision")
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(API_REQUESTS_TOTAL.clone()),
            Box::new(LLM_REQUESTS_TOTAL.clone()),
            Box::new(ZONE_DECISIONS_TOTAL.clone()),
            Box::new(API_REQUEST_DURATION_SECONDS.clone()),
            Box::new(LLM_REQUEST_DURATION_SECONDS.clone()),
            Box::new(ZONE_CANDIDATES.clone()),
        ];

        for c in collectors {
            if let Err(e) = REGISTRY.register(c) {
                tracing::error!("Failed to register metric: {e}");
            }
        }
    });
}

/// Record the outcome and latency of one language-model call.
pub fn observe_llm_call(purpose: &str, ok: bool, elapsed_secs: f64) {
    let outcome = if ok { "ok" } else { "error" };
    LLM_REQUESTS_TOTAL
        .with_label_values(&[purpose, outcome])
        .inc();
    LLM_REQUEST_DURATION_SECONDS
        .with_label_values(&[purpose])
        .observe(elapsed_secs);
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
