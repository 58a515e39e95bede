//! Zone kind normalization and quality heuristics.
//!
//! Zones come from generic map/POI data, so the free-text `type` and `name`
//! fields are folded into a closed set of kinds before scoring.

use serde::{Deserialize, Serialize};

use super::config::{FITNESS_MARKERS, LANDMARK_QUALITY, LANDMARK_WORDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Park,
    Trail,
    Greenway,
    Runway,
    Waterfront,
    Gym,
}

/// Name substrings checked in priority order when `type` is missing or invalid.
const NAME_HINTS: [(&[&str], ZoneKind); 5] = [
    (&["park"], ZoneKind::Park),
    (&["trail", "track"], ZoneKind::Trail),
    (&["greenway"], ZoneKind::Greenway),
    (&["waterfront", "riverwalk"], ZoneKind::Waterfront),
    (&["gym", "fitness"], ZoneKind::Gym),
];

impl ZoneKind {
    pub const ALL: [ZoneKind; 6] = [
        ZoneKind::Park,
        ZoneKind::Trail,
        ZoneKind::Greenway,
        ZoneKind::Runway,
        ZoneKind::Waterfront,
        ZoneKind::Gym,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneKind::Park => "park",
            ZoneKind::Trail => "trail",
            ZoneKind::Greenway => "greenway",
            ZoneKind::Runway => "runway",
            ZoneKind::Waterfront => "waterfront",
            ZoneKind::Gym => "gym",
        }
    }

    /// Parse an explicit type label (case-insensitive, surrounding whitespace ignored).
    pub fn from_label(label: &str) -> Option<ZoneKind> {
        let label = label.trim().to_ascii_lowercase();
        ZoneKind::ALL.into_iter().find(|k| k.as_str() == label)
    }

    /// Resolve a zone's kind from its optional `type` and `name` fields.
    ///
    /// A valid `type` wins; otherwise the name is searched for hint words in
    /// fixed priority order. Unrecognized zones default to `Park`.
    pub fn resolve(zone_type: Option<&str>, name: Option<&str>) -> ZoneKind {
        if let Some(kind) = zone_type.and_then(ZoneKind::from_label) {
            return kind;
        }
        let name = name.unwrap_or_default().to_lowercase();
        NAME_HINTS
            .iter()
            .find(|(words, _)| words.iter().any(|w| name.contains(w)))
            .map(|(_, kind)| *kind)
            .unwrap_or(ZoneKind::Park)
    }

    /// Base desirability of the kind for a fitness session.
    pub fn quality_weight(self) -> f64 {
        match self {
            ZoneKind::Park => 1.0,
            ZoneKind::Trail => 0.96,
            ZoneKind::Greenway => 0.94,
            ZoneKind::Waterfront => 0.92,
            ZoneKind::Runway => 0.90,
            ZoneKind::Gym => 0.84,
        }
    }

    /// Multiplier from straight-line distance to walking/running route length.
    pub fn route_inflation(self) -> f64 {
        match self {
            ZoneKind::Runway => 1.12,
            ZoneKind::Trail => 1.18,
            ZoneKind::Greenway => 1.22,
            ZoneKind::Gym => 1.25,
            ZoneKind::Park => 1.28,
            ZoneKind::Waterfront => 1.30,
        }
    }
}

impl std::fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when the name looks like a non-fitness landmark (bridge, museum, ...)
/// and carries no fitness marker word.
pub fn is_bad_landmark(name: Option<&str>) -> bool {
    let name = match name {
        Some(n) => n.to_lowercase(),
        None => return false,
    };
    let landmark = LANDMARK_WORDS.iter().any(|w| name.contains(w));
    let fitness = FITNESS_MARKERS.iter().any(|w| name.contains(w));
    landmark && !fitness
}

/// Quality score for a zone: the kind weight, or the landmark penalty.
pub fn zone_quality(kind: ZoneKind, name: Option<&str>) -> f64 {
    if is_bad_landmark(name) {
        LANDMARK_QUALITY
    } else {
        kind.quality_weight()
    }
}
