use crate::models::MatchFilters;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find potential matches for a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub page: i32,
    #[serde(default = "default_size")]
    pub size: i32,
    #[serde(default)]
    pub filters: Option<MatchFilters>,
}

fn default_size() -> i32 {
    20
}

/// Request to clear the cached matches for a user, sent by profile and
/// skill mutation handlers after a write
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClearCacheRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}
