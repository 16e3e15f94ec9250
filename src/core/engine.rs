use crate::core::filters::apply_filters;
use crate::core::scoring::MatchScorer;
use crate::models::{MatchFilters, MatchScore, Profile, SkillAssignment};
use crate::services::cache::MatchCache;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// Failure kinds produced by the matchmaking engine
///
/// Handlers translate these into response semantics; the engine itself
/// never returns a partial result.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Incomplete profile: {0}")]
    IncompleteProfile(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Profile lookups needed by the engine
#[allow(async_fn_in_trait)]
pub trait ProfileStore: Send + Sync {
    async fn account_exists(&self, user_id: &str) -> Result<bool, MatchError>;

    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, MatchError>;

    /// One page of every profile except the given user, ordered by id
    /// ascending so pagination is deterministic across calls
    async fn profiles_excluding(
        &self,
        user_id: &str,
        page: i32,
        size: i32,
    ) -> Result<Vec<Profile>, MatchError>;
}

/// Skill-assignment lookups needed by the engine
#[allow(async_fn_in_trait)]
pub trait SkillStore: Send + Sync {
    async fn skills_for_user(&self, user_id: &str) -> Result<Vec<SkillAssignment>, MatchError>;

    async fn names_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, String>, MatchError>;
}

/// Primary photo lookup; a missing photo is not an error
#[allow(async_fn_in_trait)]
pub trait PhotoStore: Send + Sync {
    async fn primary_url(&self, user_id: &str) -> Result<Option<String>, MatchError>;
}

/// Orchestrates candidate retrieval, scoring, ranking and caching
///
/// The engine is stateless apart from the injected cache; a single
/// instance serves all requests.
pub struct MatchmakingEngine<P, S, H, C> {
    profiles: Arc<P>,
    skills: Arc<S>,
    photos: Arc<H>,
    cache: Arc<C>,
    scorer: MatchScorer,
    max_page_size: i32,
}

impl<P, S, H, C> MatchmakingEngine<P, S, H, C>
where
    P: ProfileStore,
    S: SkillStore,
    H: PhotoStore,
    C: MatchCache,
{
    pub fn new(
        profiles: Arc<P>,
        skills: Arc<S>,
        photos: Arc<H>,
        cache: Arc<C>,
        scorer: MatchScorer,
        max_page_size: i32,
    ) -> Self {
        Self {
            profiles,
            skills,
            photos,
            cache,
            scorer,
            max_page_size,
        }
    }

    /// Find potential matches for a user
    ///
    /// Returns one page of candidates ranked by composite score
    /// descending, candidate id ascending on ties. The unfiltered page is
    /// cached; `filters` narrow the returned view only.
    pub async fn find_matches(
        &self,
        user_id: &str,
        page: i32,
        size: i32,
        filters: Option<&MatchFilters>,
    ) -> Result<Vec<MatchScore>, MatchError> {
        // Pagination is validated before any cache or store access
        if page < 0 {
            return Err(MatchError::InvalidArgument(
                "page number must not be less than zero".to_string(),
            ));
        }
        if size < 1 {
            return Err(MatchError::InvalidArgument(
                "page size must be at least 1".to_string(),
            ));
        }
        let size = size.min(self.max_page_size);

        tracing::info!(
            "Finding potential matches for user: {}, page: {}, size: {}",
            user_id,
            page,
            size
        );

        if let Some(cached) = self.cache.get_candidate_list(user_id, page, size).await {
            tracing::debug!(
                "Cache hit for matches: user={}, page={}, size={}",
                user_id,
                page,
                size
            );
            return Ok(apply_filters(cached, filters));
        }

        let requester = self.load_requester(user_id).await?;

        let candidates = self.profiles.profiles_excluding(user_id, page, size).await?;
        if candidates.is_empty() {
            self.cache.put_candidate_list(user_id, page, size, &[]).await;
            return Ok(Vec::new());
        }

        let requester_skills: BTreeMap<i32, i32> = self
            .skills
            .skills_for_user(user_id)
            .await?
            .into_iter()
            .map(|skill| (skill.skill_id, skill.level))
            .collect();

        // Skill names are memoised across the batch so each distinct id
        // hits the store at most once per request
        let mut name_cache: HashMap<i32, String> = HashMap::new();

        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            if let Some(hit) = self.cache.get_pair_score(user_id, &candidate.id).await {
                scored.push(hit);
                continue;
            }

            let score = self
                .score_candidate(&requester, candidate, &requester_skills, &mut name_cache)
                .await?;
            self.cache.put_pair_score(user_id, &candidate.id, &score).await;
            scored.push(score);
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        self.cache
            .put_candidate_list(user_id, page, size, &scored)
            .await;

        tracing::info!(
            "Scored {} candidates for user {} (page {})",
            scored.len(),
            user_id,
            page
        );

        Ok(apply_filters(scored, filters))
    }

    /// Drop every cached candidate list and pair score involving the
    /// user; invoked by profile and skill mutation handlers
    pub async fn clear_user_match_cache(&self, user_id: &str) {
        tracing::info!("Clearing match cache for user: {}", user_id);
        self.cache.evict_for_user(user_id).await;
    }

    async fn load_requester(&self, user_id: &str) -> Result<Profile, MatchError> {
        if !self.profiles.account_exists(user_id).await? {
            return Err(MatchError::NotFound(format!(
                "user not found: {}",
                user_id
            )));
        }

        let profile = self
            .profiles
            .profile(user_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("profile not found for user: {}", user_id)))?;

        // Product rule: an incomplete profile cannot request matches
        if profile.gender.is_none() {
            return Err(MatchError::IncompleteProfile(
                "please complete your profile by setting your gender".to_string(),
            ));
        }
        if profile.interests.is_empty() {
            return Err(MatchError::IncompleteProfile(
                "please add some interests to your profile".to_string(),
            ));
        }

        Ok(profile)
    }

    async fn score_candidate(
        &self,
        requester: &Profile,
        candidate: &Profile,
        requester_skills: &BTreeMap<i32, i32>,
        name_cache: &mut HashMap<i32, String>,
    ) -> Result<MatchScore, MatchError> {
        let candidate_skills = self.skills.skills_for_user(&candidate.id).await?;

        let breakdown = self
            .scorer
            .score(requester, candidate, requester_skills, &candidate_skills);

        let mut common_skill_ids: Vec<i32> = candidate_skills
            .iter()
            .map(|skill| skill.skill_id)
            .filter(|id| requester_skills.contains_key(id))
            .collect();
        common_skill_ids.sort_unstable();

        let common_skills = self.resolve_names(&common_skill_ids, name_cache).await?;

        let photo_url = self.photos.primary_url(&candidate.id).await?;

        tracing::debug!(
            "Match score {} -> {}: skill={:.3}, distance={:.3}, exp={:.3}, total={:.3}",
            requester.id,
            candidate.id,
            breakdown.skill,
            breakdown.distance,
            breakdown.experience,
            breakdown.total
        );

        Ok(MatchScore {
            user_id: candidate.id.clone(),
            display_name: candidate.display_name.clone(),
            bio: candidate.bio.clone(),
            gender: candidate.gender,
            experience_yrs: candidate.experience_yrs,
            distance_km: breakdown.distance_km,
            score: breakdown.total,
            common_skills,
            common_skill_ids,
            photo_url,
        })
    }

    async fn resolve_names(
        &self,
        skill_ids: &[i32],
        name_cache: &mut HashMap<i32, String>,
    ) -> Result<Vec<String>, MatchError> {
        let missing: Vec<i32> = skill_ids
            .iter()
            .copied()
            .filter(|id| !name_cache.contains_key(id))
            .collect();

        if !missing.is_empty() {
            name_cache.extend(self.skills.names_by_ids(&missing).await?);
        }

        Ok(skill_ids
            .iter()
            .filter_map(|id| name_cache.get(id).cloned())
            .collect())
    }
}
