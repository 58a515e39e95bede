// POST /zone-decision

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::decision::{self, ZoneDecision};
use crate::engine::geo::Coordinate;
use crate::engine::route::{IdealPath, TimeOfDay};
use crate::engine::scorer::{PlayerContext, Zone};
use crate::error::ApiError;

// ── Request types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInput {
    pub id: String,
    pub center: Coordinate,
    #[serde(default)]
    pub is_owned: Option<bool>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub zone_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionContextInput {
    pub current_location: Coordinate,
    #[serde(default)]
    pub streak: Option<u32>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
}

#[derive(Debug, Deserialize)]
pub struct ZoneDecisionRequest {
    #[serde(default)]
    pub zones: Vec<ZoneInput>,
    pub context: DecisionContextInput,
}

impl From<ZoneInput> for Zone {
    fn from(input: ZoneInput) -> Self {
        Zone {
            id: input.id,
            center: input.center,
            is_owned: input.is_owned.unwrap_or(false),
            level: input.level.unwrap_or(1),
            name: input.name,
            zone_type: input.zone_type,
        }
    }
}

impl From<DecisionContextInput> for PlayerContext {
    fn from(input: DecisionContextInput) -> Self {
        PlayerContext {
            current_location: input.current_location,
            streak: input.streak.unwrap_or(0),
            level: input.level.unwrap_or(1),
            time_of_day: input.time_of_day.unwrap_or_default(),
        }
    }
}

// ── Response types ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDecisionResponse {
    pub zone_id: String,
    pub score: f64,
    pub reason: String,
    pub model: String,
    pub distance_km: f64,
    pub estimated_route_km: f64,
    pub estimated_travel_minutes: u32,
    pub ideal_path: IdealPath,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl From<ZoneDecision> for ZoneDecisionResponse {
    fn from(decision: ZoneDecision) -> Self {
        let m = decision.metrics;
        ZoneDecisionResponse {
            zone_id: decision.zone_id,
            score: round_to(m.score, 4),
            reason: decision.reason,
            model: decision.model,
            distance_km: round_to(m.distance_km, 2),
            estimated_route_km: round_to(m.estimated_route_km, 2),
            estimated_travel_minutes: m.estimated_travel_minutes,
            ideal_path: m.ideal_path,
        }
    }
}

// ── Handler ───────────────────────────────────────────────────────────

pub async fn zone_decision(
    State(state): State<AppState>,
    payload: Result<Json<ZoneDecisionRequest>, JsonRejection>,
) -> Result<Json<ZoneDecisionResponse>, ApiError> {
    let Json(req) = payload?;
    let zones: Vec<Zone> = req.zones.into_iter().map(Zone::from).collect();
    let ctx = PlayerContext::from(req.context);

    let decision = decision::decide(&zones, &ctx, state.zone_reasoning, state.model()).await?;
    Ok(Json(decision.into()))
}
