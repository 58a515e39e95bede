// Session targets and route/travel estimation.

use serde::{Deserialize, Serialize};

use super::config::*;
use super::zone_kind::ZoneKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    #[default]
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }

    fn base_target_km(self) -> f64 {
        match self {
            TimeOfDay::Morning => TARGET_KM_MORNING,
            TimeOfDay::Afternoon => TARGET_KM_AFTERNOON,
            TimeOfDay::Evening => TARGET_KM_EVENING,
            TimeOfDay::Night => TARGET_KM_NIGHT,
        }
    }
}

/// Suggested shape of the session once the player reaches the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdealPath {
    #[serde(rename = "warmup out-and-back")]
    WarmupOutAndBack,
    #[serde(rename = "single loop")]
    SingleLoop,
    #[serde(rename = "progressive loop")]
    ProgressiveLoop,
    #[serde(rename = "controlled out-and-back")]
    ControlledOutAndBack,
}

impl IdealPath {
    pub fn label(self) -> &'static str {
        match self {
            IdealPath::WarmupOutAndBack => "warmup out-and-back",
            IdealPath::SingleLoop => "single loop",
            IdealPath::ProgressiveLoop => "progressive loop",
            IdealPath::ControlledOutAndBack => "controlled out-and-back",
        }
    }
}

impl std::fmt::Display for IdealPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Session distance goal: a time-of-day base plus a capped per-level bump.
pub fn target_distance_km(time_of_day: TimeOfDay, player_level: u32) -> f64 {
    let levels_above_first = player_level.saturating_sub(1) as f64;
    let level_bonus = (levels_above_first * TARGET_KM_PER_LEVEL).min(TARGET_KM_LEVEL_CAP);
    time_of_day.base_target_km() + level_bonus
}

/// Estimated path length to the zone from the straight-line distance.
pub fn estimate_route_km(crow_km: f64, kind: ZoneKind) -> f64 {
    crow_km * kind.route_inflation()
}

/// Assumed moving pace in km/h; grows with level up to a cap.
pub fn pace_kmh(player_level: u32) -> f64 {
    (BASE_PACE_KMH + PACE_KMH_PER_LEVEL * player_level as f64).min(MAX_PACE_KMH)
}

/// Travel time in whole minutes, never below the minimum estimate.
pub fn estimate_travel_minutes(route_km: f64, player_level: u32) -> u32 {
    let minutes = (route_km / pace_kmh(player_level) * 60.0).round();
    (minutes as u32).max(MIN_TRAVEL_MINUTES)
}

pub fn ideal_path(route_km: f64, player_level: u32) -> IdealPath {
    if route_km <= WARMUP_ROUTE_KM {
        IdealPath::WarmupOutAndBack
    } else if route_km <= SINGLE_LOOP_ROUTE_KM {
        IdealPath::SingleLoop
    } else if player_level >= PROGRESSIVE_LOOP_MIN_LEVEL {
        IdealPath::ProgressiveLoop
    } else {
        IdealPath::ControlledOutAndBack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_target_base_by_time_of_day() {
        assert!(approx(target_distance_km(TimeOfDay::Morning, 1), 1.8));
        assert!(approx(target_distance_km(TimeOfDay::Afternoon, 1), 2.4));
        assert!(approx(target_distance_km(TimeOfDay::Evening, 1), 2.2));
        assert!(approx(target_distance_km(TimeOfDay::Night, 1), 1.4));
    }

    #[test]
    fn test_target_level_bonus_capped() {
        // Level 5: 4 levels above first, +0.6 km.
        assert!(approx(target_distance_km(TimeOfDay::Morning, 5), 2.4));
        // Level 13 hits the +1.8 km cap; anything higher stays there.
        assert!(approx(target_distance_km(TimeOfDay::Night, 13), 3.2));
        assert!(approx(target_distance_km(TimeOfDay::Night, 50), 3.2));
    }

    #[test]
    fn test_level_zero_treated_as_first() {
        assert!(approx(target_distance_km(TimeOfDay::Evening, 0), 2.2));
    }

    #[test]
    fn test_route_inflation() {
        assert!(approx(estimate_route_km(1.0, ZoneKind::Park), 1.28));
        assert!(approx(estimate_route_km(2.0, ZoneKind::Trail), 2.36));
        assert_eq!(estimate_route_km(0.0, ZoneKind::Gym), 0.0);
    }

    #[test]
    fn test_pace_capped() {
        assert!(approx(pace_kmh(1), 5.08));
        assert!(approx(pace_kmh(10), 7.5));
        assert!(approx(pace_kmh(100), 7.5));
    }

    #[test]
    fn test_travel_minutes() {
        // 5.08 km/h at level 1: 2.54 km takes 30 minutes.
        assert_eq!(estimate_travel_minutes(2.54, 1), 30);
        // Very short routes floor at the minimum.
        assert_eq!(estimate_travel_minutes(0.0, 1), MIN_TRAVEL_MINUTES);
        assert_eq!(estimate_travel_minutes(0.1, 3), MIN_TRAVEL_MINUTES);
    }

    #[test]
    fn test_ideal_path_thresholds() {
        assert_eq!(ideal_path(1.4, 1), IdealPath::WarmupOutAndBack);
        assert_eq!(ideal_path(1.41, 1), IdealPath::SingleLoop);
        assert_eq!(ideal_path(3.5, 8), IdealPath::SingleLoop);
        assert_eq!(ideal_path(5.0, 5), IdealPath::ProgressiveLoop);
        assert_eq!(ideal_path(5.0, 4), IdealPath::ControlledOutAndBack);
    }

    #[test]
    fn test_labels_serialize() {
        assert_eq!(
            serde_json::to_string(&IdealPath::WarmupOutAndBack).unwrap(),
            "\"warmup out-and-back\""
        );
        assert_eq!(
            serde_json::to_string(&TimeOfDay::Night).unwrap(),
            "\"night\""
        );
    }
}
