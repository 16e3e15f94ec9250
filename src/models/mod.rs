// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Gender, MatchFilters, MatchScore, Profile, ScoringWeights, SkillAssignment};
pub use requests::{ClearCacheRequest, FindMatchesRequest};
pub use responses::{ClearCacheResponse, ErrorResponse, FindMatchesResponse, HealthResponse};
