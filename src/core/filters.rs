use crate::models::{MatchFilters, MatchScore};

/// Check a scored candidate against the caller-supplied filters
///
/// Filters run after scoring, on both freshly computed and cached pages,
/// so the candidate-list cache never has to key on filter contents.
pub fn passes_filters(score: &MatchScore, filters: &MatchFilters) -> bool {
    // Unknown distance is represented by a sentinel far beyond any
    // realistic max filter, so it fails the check naturally.
    if let Some(max_km) = filters.max_distance_km {
        if score.distance_km > max_km {
            return false;
        }
    }

    // Experience filters exclude candidates with no recorded experience
    if let Some(min_exp) = filters.min_experience {
        match score.experience_yrs {
            Some(exp) if exp >= min_exp => {}
            _ => return false,
        }
    }
    if let Some(max_exp) = filters.max_experience {
        match score.experience_yrs {
            Some(exp) if exp <= max_exp => {}
            _ => return false,
        }
    }

    if let Some(gender) = filters.gender {
        if score.gender != Some(gender) {
            return false;
        }
    }

    // Any shared skill from the requested set is enough
    if let Some(skill_ids) = &filters.skill_ids {
        if !skill_ids.is_empty()
            && !skill_ids
                .iter()
                .any(|id| score.common_skill_ids.contains(id))
        {
            return false;
        }
    }

    true
}

/// Apply optional filters to a scored page, preserving order
pub fn apply_filters(scores: Vec<MatchScore>, filters: Option<&MatchFilters>) -> Vec<MatchScore> {
    match filters {
        Some(filters) => scores
            .into_iter()
            .filter(|score| passes_filters(score, filters))
            .collect(),
        None => scores,
    }
}
