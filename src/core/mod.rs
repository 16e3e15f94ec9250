// Core algorithm exports
pub mod distance;
pub mod engine;
pub mod filters;
pub mod scoring;

pub use distance::{distance_km, haversine_distance, UNKNOWN_DISTANCE_KM};
pub use engine::{MatchError, MatchmakingEngine, PhotoStore, ProfileStore, SkillStore};
pub use filters::{apply_filters, passes_filters};
pub use scoring::{experience_score, skill_score, MatchScorer, ScoreBreakdown};
