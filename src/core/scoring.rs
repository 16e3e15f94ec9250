use crate::core::distance::distance_km;
use crate::models::{Profile, ScoringWeights, SkillAssignment};
use std::collections::BTreeMap;

/// Distance beyond which geographic closeness contributes nothing
const CLOSENESS_RANGE_KM: f64 = 100.0;

/// Experience gap at which the experience score bottoms out
const EXPERIENCE_DECAY_YEARS: f64 = 20.0;

/// Per-factor scores for one (requester, candidate) pair
#[derive(Debug, Clone, Copy)]
pub struct ScoreBreakdown {
    pub skill: f64,
    pub distance_km: f64,
    pub distance: f64,
    pub experience: f64,
    pub total: f64,
}

/// Skill compatibility score in [0, 1]
///
/// `total_possible` squares the requester's levels so high-level skills
/// weigh more; `matching` multiplies the two levels for each shared skill.
pub fn skill_score(
    requester_skills: &BTreeMap<i32, i32>,
    candidate_skills: &[SkillAssignment],
) -> f64 {
    if requester_skills.is_empty() || candidate_skills.is_empty() {
        return 0.0;
    }

    let total_possible: f64 = requester_skills
        .values()
        .map(|level| (level * level) as f64)
        .sum();

    if total_possible == 0.0 {
        return 0.0;
    }

    let matching: f64 = candidate_skills
        .iter()
        .filter_map(|skill| {
            requester_skills
                .get(&skill.skill_id)
                .map(|level| (level * skill.level) as f64)
        })
        .sum();

    (matching / total_possible).min(1.0)
}

/// Experience similarity score in [0, 1]
///
/// Neutral 0.5 when either side has no experience recorded; otherwise full
/// score at equal experience, decaying linearly to 0 at a 20-year gap.
pub fn experience_score(exp1: Option<i32>, exp2: Option<i32>) -> f64 {
    match (exp1, exp2) {
        (Some(a), Some(b)) => {
            let diff = (a - b).abs() as f64;
            (1.0 - diff / EXPERIENCE_DECAY_YEARS).max(0.0)
        }
        _ => 0.5,
    }
}

/// Convert a raw distance into a closeness score in [0, 1]
///
/// Anything beyond 100 km (including the unknown-location sentinel)
/// contributes zero.
#[inline]
pub fn distance_score(distance_km: f64) -> f64 {
    1.0 - (distance_km / CLOSENESS_RANGE_KM).min(1.0)
}

/// Composes skill, distance and experience scores into a weighted
/// composite in [0, 1]
#[derive(Debug, Clone, Copy)]
pub struct MatchScorer {
    weights: ScoringWeights,
}

impl MatchScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    /// Score a candidate against the requester
    ///
    /// Missing skills, coordinates or experience degrade the relevant
    /// factor instead of failing.
    pub fn score(
        &self,
        requester: &Profile,
        candidate: &Profile,
        requester_skills: &BTreeMap<i32, i32>,
        candidate_skills: &[SkillAssignment],
    ) -> ScoreBreakdown {
        let skill = skill_score(requester_skills, candidate_skills);

        let distance_km = distance_km(requester.coordinates(), candidate.coordinates());
        let distance = distance_score(distance_km);

        let experience = experience_score(requester.experience_yrs, candidate.experience_yrs);

        let total = skill * self.weights.skill
            + distance * self.weights.distance
            + experience * self.weights.experience;

        ScoreBreakdown {
            skill,
            distance_km,
            distance,
            experience,
            total: total.clamp(0.0, 1.0),
        }
    }
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
