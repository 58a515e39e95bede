//! Composite zone scoring and best-zone selection.
//!
//! ```text
//! score = proximity    * 0.34   1 / (1 + crow_km)
//!       + distance_fit * 0.24   1 / (1 + |route_km - target_km|)
//!       + quality      * 0.20   kind weight or landmark penalty
//!       + ownership    * 0.14   1.0 unowned, 0.35 owned
//!       + level_fit    * 0.08   max(0.25, 1 - |zone_lvl - player_lvl| / 6)
//!       + streak_bonus          min(0.2, streak / 50)
//! ```
//!
//! Every function here is total and side-effect free.

use super::config::*;
use super::geo::Coordinate;
use super::route::{self, IdealPath, TimeOfDay};
use super::zone_kind::{self, ZoneKind};

/// A candidate zone as supplied by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    pub center: Coordinate,
    pub is_owned: bool,
    pub level: u32,
    pub name: Option<String>,
    pub zone_type: Option<String>,
}

/// Player state for a single decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerContext {
    pub current_location: Coordinate,
    pub streak: u32,
    pub level: u32,
    pub time_of_day: TimeOfDay,
}

/// Individual score terms before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreTerms {
    pub proximity: f64,
    pub distance_fit: f64,
    pub quality: f64,
    pub ownership: f64,
    pub level_fit: f64,
    pub streak_bonus: f64,
}

impl ScoreTerms {
    pub fn total(&self) -> f64 {
        self.proximity * WEIGHT_PROXIMITY
            + self.distance_fit * WEIGHT_DISTANCE_FIT
            + self.quality * WEIGHT_QUALITY
            + self.ownership * WEIGHT_OWNERSHIP
            + self.level_fit * WEIGHT_LEVEL_FIT
            + self.streak_bonus
    }
}

/// Derived per-zone figures. Computed per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneMetrics {
    pub score: f64,
    pub kind: ZoneKind,
    pub distance_km: f64,
    pub estimated_route_km: f64,
    pub estimated_travel_minutes: u32,
    pub ideal_path: IdealPath,
    pub terms: ScoreTerms,
}

pub fn proximity(crow_km: f64) -> f64 {
    1.0 / (1.0 + crow_km)
}

pub fn distance_fit(route_km: f64, target_km: f64) -> f64 {
    1.0 / (1.0 + (route_km - target_km).abs())
}

pub fn ownership(is_owned: bool) -> f64 {
    if is_owned {
        OWNERSHIP_OWNED
    } else {
        OWNERSHIP_UNOWNED
    }
}

pub fn level_fit(zone_level: u32, player_level: u32) -> f64 {
    let gap = (zone_level as f64 - player_level as f64).abs();
    (1.0 - gap / LEVEL_FIT_SPAN).max(LEVEL_FIT_FLOOR)
}

pub fn streak_bonus(streak: u32) -> f64 {
    (streak as f64 / STREAK_BONUS_DIVISOR).min(STREAK_BONUS_CAP)
}

/// Score one zone for the given player.
pub fn score_zone(zone: &Zone, ctx: &PlayerContext) -> ZoneMetrics {
    let kind = ZoneKind::resolve(zone.zone_type.as_deref(), zone.name.as_deref());
    let crow_km = ctx.current_location.distance_km(&zone.center);
    let route_km = route::estimate_route_km(crow_km, kind);
    let target_km = route::target_distance_km(ctx.time_of_day, ctx.level);

    let terms = ScoreTerms {
        proximity: proximity(crow_km),
        distance_fit: distance_fit(route_km, target_km),
        quality: zone_kind::zone_quality(kind, zone.name.as_deref()),
        ownership: ownership(zone.is_owned),
        level_fit: level_fit(zone.level, ctx.level),
        streak_bonus: streak_bonus(ctx.streak),
    };

    ZoneMetrics {
        score: terms.total(),
        kind,
        distance_km: crow_km,
        estimated_route_km: route_km,
        estimated_travel_minutes: route::estimate_travel_minutes(route_km, ctx.level),
        ideal_path: route::ideal_path(route_km, ctx.level),
        terms,
    }
}

/// Score every zone and return the best one with its metrics.
///
/// Ties go to the earliest zone in input order. Returns `None` for an empty slice.
pub fn select_best<'a>(zones: &'a [Zone], ctx: &PlayerContext) -> Option<(&'a Zone, ZoneMetrics)> {
    let mut best: Option<(&Zone, ZoneMetrics)> = None;
    for zone in zones {
        let metrics = score_zone(zone, ctx);
        let better = match &best {
            Some((_, current)) => metrics.score > current.score,
            None => true,
        };
        if better {
            best = Some((zone, metrics));
        }
    }
    best
}
