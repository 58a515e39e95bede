// Scoring constants for zone ranking.
//
// All distances are kilometres, paces km/h. Weights are tuned against
// haversine distances.

// Score weights. The non-bonus terms sum to 1.0.
pub const WEIGHT_PROXIMITY: f64 = 0.34;
pub const WEIGHT_DISTANCE_FIT: f64 = 0.24;
pub const WEIGHT_QUALITY: f64 = 0.20;
pub const WEIGHT_OWNERSHIP: f64 = 0.14;
pub const WEIGHT_LEVEL_FIT: f64 = 0.08;

// Ownership term
pub const OWNERSHIP_UNOWNED: f64 = 1.0;
pub const OWNERSHIP_OWNED: f64 = 0.35;

// Level fit: 1 - |zone - player| / LEVEL_FIT_SPAN, floored
pub const LEVEL_FIT_SPAN: f64 = 6.0;
pub const LEVEL_FIT_FLOOR: f64 = 0.25;

// Streak bonus: min(STREAK_BONUS_CAP, streak / STREAK_BONUS_DIVISOR)
pub const STREAK_BONUS_DIVISOR: f64 = 50.0;
pub const STREAK_BONUS_CAP: f64 = 0.2;

// Target session distance
pub const TARGET_KM_MORNING: f64 = 1.8;
pub const TARGET_KM_AFTERNOON: f64 = 2.4;
pub const TARGET_KM_EVENING: f64 = 2.2;
pub const TARGET_KM_NIGHT: f64 = 1.4;
pub const TARGET_KM_PER_LEVEL: f64 = 0.15;
pub const TARGET_KM_LEVEL_CAP: f64 = 1.8;

// Pace model
pub const BASE_PACE_KMH: f64 = 4.8;
pub const PACE_KMH_PER_LEVEL: f64 = 0.28;
pub const MAX_PACE_KMH: f64 = 7.5;
pub const MIN_TRAVEL_MINUTES: u32 = 4;

// Ideal path thresholds (route km)
pub const WARMUP_ROUTE_KM: f64 = 1.4;
pub const SINGLE_LOOP_ROUTE_KM: f64 = 3.5;
pub const PROGRESSIVE_LOOP_MIN_LEVEL: u32 = 5;

// Quality assigned to landmark POIs without a fitness marker
pub const LANDMARK_QUALITY: f64 = 0.15;

pub const LANDMARK_WORDS: [&str; 8] = [
    "bridge",
    "terminal",
    "museum",
    "courthouse",
    "station",
    "tunnel",
    "airport",
    "pier",
];

pub const FITNESS_MARKERS: [&str; 7] = [
    "park", "trail", "track", "greenway", "run", "fitness", "gym",
];
