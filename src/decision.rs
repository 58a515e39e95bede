// Zone decision: pick the best candidate and explain the pick.

use std::collections::HashSet;
use std::time::Instant;

use serde_json::json;

use crate::engine::scorer::{self, PlayerContext, Zone, ZoneMetrics};
use crate::error::ApiError;
use crate::llm::{strip_code_blocks, ChatModel, ChatRequest, LlmError, Turn};
use crate::metrics;

/// Model label reported when the reason was not written by a language model.
pub const HEURISTIC_MODEL: &str = "heuristic";

pub const FALLBACK_REASON: &str =
    "This zone offers the best balance of distance, quality, and ownership for your next session.";

const REASONING_PROMPT: &str = "\
You are the FitZone zone strategist. A player is choosing which map zone to capture next. \
Given the chosen zone, the player's context, and the computed score and metrics as JSON, \
explain in one or two short, motivating sentences why this zone is the best next target. \
Reply with plain text only, no JSON and no markdown.";

/// How the winning zone's reason is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReasoningMode {
    /// Deterministic sentence built from the zone metrics.
    #[default]
    Template,
    /// Ask the language model, falling back to a static sentence on any failure.
    Llm,
}

impl ReasoningMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasoningMode::Template => "template",
            ReasoningMode::Llm => "llm",
        }
    }
}

impl std::str::FromStr for ReasoningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" => Ok(ReasoningMode::Template),
            "llm" | "gemini" => Ok(ReasoningMode::Llm),
            other => Err(format!("unknown reasoning mode: {other}")),
        }
    }
}

/// Why the model-written reason was not used.
#[derive(Debug, thiserror::Error)]
pub enum ReasonFailure {
    #[error("no language model configured")]
    MissingCredentials,
    #[error(transparent)]
    Model(#[from] LlmError),
}

/// The outcome of a decision request.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDecision {
    pub zone_id: String,
    pub reason: String,
    /// Who wrote the reason: a model name or `heuristic`.
    pub model: String,
    pub metrics: ZoneMetrics,
}

/// Check client-supplied zones before any scoring happens.
pub fn validate_zones(zones: &[Zone]) -> Result<(), ApiError> {
    if zones.is_empty() {
        return Err(ApiError::validation("No zones provided"));
    }
    let mut seen = HashSet::with_capacity(zones.len());
    for zone in zones {
        if zone.id.trim().is_empty() {
            return Err(ApiError::validation("Zone id must not be empty"));
        }
        if !seen.insert(zone.id.as_str()) {
            return Err(ApiError::validation(format!("Duplicate zone id: {}", zone.id)));
        }
        if zone.level < 1 {
            return Err(ApiError::validation(format!(
                "Zone {} level must be at least 1",
                zone.id
            )));
        }
        zone.center.validate()?;
    }
    Ok(())
}

pub fn validate_context(ctx: &PlayerContext) -> Result<(), ApiError> {
    if ctx.level < 1 {
        return Err(ApiError::validation("Player level must be at least 1"));
    }
    ctx.current_location.validate()?;
    Ok(())
}

/// Deterministic one-line explanation from the metrics.
pub fn template_reason(zone: &Zone, metrics: &ZoneMetrics) -> String {
    let name = zone
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(zone.id.as_str());
    format!(
        "{} is about {:.2} km away (~{} min). {} fits your session today.",
        name,
        metrics.estimated_route_km,
        metrics.estimated_travel_minutes,
        capitalize(metrics.ideal_path.label()),
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn reasoning_request(zone: &Zone, ctx: &PlayerContext, metrics: &ZoneMetrics) -> ChatRequest {
    let payload = json!({
        "zone": {
            "id": zone.id,
            "name": zone.name,
            "type": metrics.kind,
            "isOwned": zone.is_owned,
            "level": zone.level,
        },
        "context": {
            "streak": ctx.streak,
            "level": ctx.level,
            "timeOfDay": ctx.time_of_day,
        },
        "score": metrics.score,
        "metrics": {
            "distanceKm": metrics.distance_km,
            "estimatedRouteKm": metrics.estimated_route_km,
            "estimatedTravelMinutes": metrics.estimated_travel_minutes,
            "idealPath": metrics.ideal_path,
        },
    });
    let mut request = ChatRequest::new("reasoning", REASONING_PROMPT);
    request.push(Turn::user(payload.to_string()));
    request
}

/// Ask the model to justify the pick.
pub async fn llm_reason(
    model: Option<&dyn ChatModel>,
    zone: &Zone,
    ctx: &PlayerContext,
    zone_metrics: &ZoneMetrics,
) -> Result<String, ReasonFailure> {
    let model = model.ok_or(ReasonFailure::MissingCredentials)?;
    let request = reasoning_request(zone, ctx, zone_metrics);

    let started = Instant::now();
    let result = model.complete(&request).await;
    metrics::observe_llm_call(request.purpose, result.is_ok(), started.elapsed().as_secs_f64());

    let text = strip_code_blocks(&result?).trim().to_string();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse.into());
    }
    Ok(text)
}

/// Score the candidates, pick the best, and attach a reason.
pub async fn decide(
    zones: &[Zone],
    ctx: &PlayerContext,
    mode: ReasoningMode,
    model: Option<&dyn ChatModel>,
) -> Result<ZoneDecision, ApiError> {
    validate_zones(zones)?;
    validate_context(ctx)?;
    metrics::ZONE_CANDIDATES.observe(zones.len() as f64);

    let (zone, zone_metrics) = scorer::select_best(zones, ctx)
        .ok_or_else(|| ApiError::validation("No zones provided"))?;

    let (reason, model_label, source) = match mode {
        ReasoningMode::Template => (
            template_reason(zone, &zone_metrics),
            HEURISTIC_MODEL.to_string(),
            "template",
        ),
        ReasoningMode::Llm => match llm_reason(model, zone, ctx, &zone_metrics).await {
            Ok(text) => {
                let name = model.map_or(HEURISTIC_MODEL, |m| m.model_name());
                (text, name.to_string(), "llm")
            }
            Err(failure) => {
                tracing::warn!(zone_id = %zone.id, "Zone reasoning fell back: {failure}");
                (FALLBACK_REASON.to_string(), HEURISTIC_MODEL.to_string(), "fallback")
            }
        },
    };

    metrics::ZONE_DECISIONS_TOTAL
        .with_label_values(&[source])
        .inc();
    tracing::info!(
        zone_id = %zone.id,
        score = zone_metrics.score,
        candidates = zones.len(),
        reasoning = source,
        "Zone decision"
    );

    Ok(ZoneDecision {
        zone_id: zone.id.clone(),
        reason,
        model: model_label,
        metrics: zone_metrics,
    })
}
