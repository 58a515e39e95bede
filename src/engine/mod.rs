// Zone ranking engine: geodesy, zone heuristics, and the composite scorer.

pub mod config;
pub mod geo;
pub mod route;
pub mod scorer;
pub mod zone_kind;
