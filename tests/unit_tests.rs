// Unit tests for the techmatch scoring primitives

use std::collections::BTreeMap;

use techmatch::core::distance::{distance_km, haversine_distance, UNKNOWN_DISTANCE_KM};
use techmatch::core::filters::passes_filters;
use techmatch::core::scoring::{distance_score, experience_score, skill_score, MatchScorer};
use techmatch::models::{Gender, MatchFilters, MatchScore, Profile, SkillAssignment};

fn skills(pairs: &[(i32, i32)]) -> BTreeMap<i32, i32> {
    pairs.iter().copied().collect()
}

fn assignments(pairs: &[(i32, i32)]) -> Vec<SkillAssignment> {
    pairs
        .iter()
        .map(|&(skill_id, level)| SkillAssignment { skill_id, level })
        .collect()
}

#[test]
fn test_distance_identity_at_various_points() {
    for &(lat, lon) in &[
        (0.0, 0.0),
        (37.7749, -122.4194),
        (-33.8688, 151.2093),
        (89.9, 179.9),
    ] {
        let d = haversine_distance(lat, lon, lat, lon);
        assert!(d.abs() < 0.01, "distance to self at ({}, {}) was {}", lat, lon, d);
    }
}

#[test]
fn test_distance_symmetry() {
    let points = [
        (51.5074, -0.1278),
        (48.8566, 2.3522),
        (35.6762, 139.6503),
        (-23.5505, -46.6333),
    ];
    for a in points {
        for b in points {
            let ab = haversine_distance(a.0, a.1, b.0, b.1);
            let ba = haversine_distance(b.0, b.1, a.0, a.1);
            assert!((ab - ba).abs() < 1e-9);
        }
    }
}

#[test]
fn test_missing_location_scores_as_incompatible() {
    let d = distance_km(None, Some((37.7749, -122.4194)));
    assert_eq!(d, UNKNOWN_DISTANCE_KM);
    assert_eq!(distance_score(d), 0.0);
}

#[test]
fn test_skill_score_empty_either_side_is_zero() {
    assert_eq!(skill_score(&skills(&[]), &assignments(&[(1, 3)])), 0.0);
    assert_eq!(skill_score(&skills(&[(1, 3)]), &assignments(&[])), 0.0);
}

#[test]
fn test_skill_score_self_match_upper_bound() {
    for pairs in [
        vec![(1, 1)],
        vec![(1, 5), (2, 3)],
        vec![(4, 2), (9, 5), (12, 4)],
    ] {
        let score = skill_score(&skills(&pairs), &assignments(&pairs));
        assert!((score - 1.0).abs() < 1e-9, "self match for {:?} was {}", pairs, score);
    }
}

#[test]
fn test_skill_score_worked_ratio() {
    // matching 5*5 over possible 5^2 + 3^2
    let score = skill_score(&skills(&[(1, 5), (2, 3)]), &assignments(&[(1, 5)]));
    assert!((score - 25.0 / 34.0).abs() < 1e-9);
}

#[test]
fn test_experience_identity_and_neutral_default() {
    for e in [0, 3, 10, 40] {
        assert_eq!(experience_score(Some(e), Some(e)), 1.0);
    }
    assert_eq!(experience_score(None, Some(12)), 0.5);
    assert_eq!(experience_score(Some(12), None), 0.5);
}

#[test]
fn test_composite_range_over_random_inputs() {
    let scorer = MatchScorer::with_default_weights();
    let mut seed: u64 = 0x9E3779B97F4A7C15;
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed
    };

    for _ in 0..1000 {
        let r = next();
        let c = next();
        let requester = Profile {
            id: "r".to_string(),
            display_name: "R".to_string(),
            bio: None,
            gender: Some(Gender::Female),
            date_of_birth: None,
            latitude: (r % 2 == 0).then(|| (r % 180) as f64 - 90.0),
            longitude: (r % 2 == 0).then(|| (r % 360) as f64 - 180.0),
            experience_yrs: (r % 3 != 0).then(|| (r % 50) as i32),
            interests: vec![],
        };
        let candidate = Profile {
            id: "c".to_string(),
            display_name: "C".to_string(),
            bio: None,
            gender: Some(Gender::Male),
            date_of_birth: None,
            latitude: (c % 2 == 0).then(|| (c % 180) as f64 - 90.0),
            longitude: (c % 2 == 0).then(|| (c % 360) as f64 - 180.0),
            experience_yrs: (c % 3 != 0).then(|| (c % 50) as i32),
            interests: vec![],
        };

        let req_skills = skills(&[
            ((next() % 10) as i32, (next() % 5) as i32 + 1),
            ((next() % 10) as i32, (next() % 5) as i32 + 1),
        ]);
        let cand_skills = assignments(&[
            ((next() % 10) as i32, (next() % 5) as i32 + 1),
            ((next() % 10) as i32, (next() % 5) as i32 + 1),
        ]);

        let breakdown = scorer.score(&requester, &candidate, &req_skills, &cand_skills);
        assert!(
            (0.0..=1.0).contains(&breakdown.total),
            "composite {} out of range",
            breakdown.total
        );
        assert!((0.0..=1.0).contains(&breakdown.skill));
        assert!((0.0..=1.0).contains(&breakdown.distance));
        assert!((0.0..=1.0).contains(&breakdown.experience));
    }
}

#[test]
fn test_filter_on_unknown_distance_rejects() {
    let score = MatchScore {
        user_id: "c".to_string(),
        display_name: "C".to_string(),
        bio: None,
        gender: Some(Gender::Other),
        experience_yrs: Some(5),
        distance_km: UNKNOWN_DISTANCE_KM,
        score: 0.7,
        common_skills: vec![],
        common_skill_ids: vec![],
        photo_url: None,
    };
    let filters = MatchFilters {
        max_distance_km: Some(1000.0),
        ..Default::default()
    };
    assert!(!passes_filters(&score, &filters));
    assert!(passes_filters(&score, &MatchFilters::default()));
}
