use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Profile gender as stored by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "MALE"),
            Gender::Female => write!(f, "FEMALE"),
            Gender::Other => write!(f, "OTHER"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

/// A user's dating profile
///
/// Profiles are created lazily, so any field beyond the identity may be
/// missing. Scoring degrades gracefully on missing data instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(rename = "dateOfBirth", default)]
    pub date_of_birth: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "experienceYrs", default)]
    pub experience_yrs: Option<i32>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl Profile {
    /// Coordinates are only usable when both halves are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// One (skill, level) pair assigned to a user, level in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAssignment {
    #[serde(rename = "skillId")]
    pub skill_id: i32,
    pub level: i32,
}

/// Scored candidate returned by the matchmaking engine
///
/// Transient value object, never persisted; it lives in the match caches
/// keyed per (requester, candidate) pair and per (requester, page, size).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub bio: Option<String>,
    pub gender: Option<Gender>,
    #[serde(rename = "experienceYrs")]
    pub experience_yrs: Option<i32>,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    pub score: f64,
    #[serde(rename = "commonSkills")]
    pub common_skills: Vec<String>,
    #[serde(rename = "commonSkillIds")]
    pub common_skill_ids: Vec<i32>,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
}

/// Optional post-scoring filters supplied by the caller
///
/// Filters narrow an already-scored page; they are never pushed into the
/// store query, so cached pages stay filter-independent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchFilters {
    #[serde(rename = "maxDistanceKm", default)]
    pub max_distance_km: Option<f64>,
    #[serde(rename = "minExperience", default)]
    pub min_experience: Option<i32>,
    #[serde(rename = "maxExperience", default)]
    pub max_experience: Option<i32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(rename = "skillIds", default)]
    pub skill_ids: Option<Vec<i32>>,
}

/// Weights for the composite match score, expected to sum to 1.0
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub skill: f64,
    pub distance: f64,
    pub experience: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill: 0.5,
            distance: 0.3,
            experience: 0.2,
        }
    }
}
