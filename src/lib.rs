//! techmatch - Matchmaking engine for the TechieDating platform
//!
//! This library implements the matchmaking scoring and candidate-retrieval
//! engine: given a requesting user it produces a ranked, paginated list of
//! compatible candidate profiles, combining skill overlap, geographic
//! distance and experience similarity into a single composite score, with
//! two-level caching to keep repeated requests cheap.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    haversine_distance, MatchError, MatchScorer, MatchmakingEngine, PhotoStore, ProfileStore,
    SkillStore,
};
pub use models::{
    FindMatchesRequest, FindMatchesResponse, Gender, MatchFilters, MatchScore, Profile,
    ScoringWeights, SkillAssignment,
};
