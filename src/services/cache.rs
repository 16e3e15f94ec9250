use crate::models::MatchScore;
use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Cache key builder for the match caches
///
/// Eviction is prefix/pattern based, so every key carries the involved
/// user ids in a fixed position.
pub struct CacheKey;

impl CacheKey {
    /// Key for one cached candidate list page
    pub fn candidate_list(requester: &str, page: i32, size: i32) -> String {
        format!("matches:{}:{}:{}", requester, page, size)
    }

    /// Key for one cached (requester, candidate) pair score
    pub fn pair_score(requester: &str, candidate: &str) -> String {
        format!("score:{}:{}", requester, candidate)
    }

    /// Patterns matching every entry the user appears in, as requester
    /// or as candidate
    pub fn user_patterns(user_id: &str) -> [String; 3] {
        [
            format!("matches:{}:*", user_id),
            format!("score:{}:*", user_id),
            format!("score:*:{}", user_id),
        ]
    }
}

/// Memoization layer for the matchmaking engine
///
/// Entries are idempotent recomputations of a deterministic function, so
/// same-key write races are last-write-wins and harmless. Implementations
/// treat their own infrastructure failures as misses rather than failing
/// the enclosing request.
#[allow(async_fn_in_trait)]
pub trait MatchCache: Send + Sync {
    async fn get_candidate_list(
        &self,
        requester: &str,
        page: i32,
        size: i32,
    ) -> Option<Vec<MatchScore>>;

    async fn put_candidate_list(
        &self,
        requester: &str,
        page: i32,
        size: i32,
        scores: &[MatchScore],
    );

    async fn get_pair_score(&self, requester: &str, candidate: &str) -> Option<MatchScore>;

    async fn put_pair_score(&self, requester: &str, candidate: &str, score: &MatchScore);

    /// Remove every cached list and pair score involving the user
    async fn evict_for_user(&self, user_id: &str);

    /// Full flush, invoked on a schedule as a correctness backstop
    async fn evict_all(&self);
}

/// In-process cache backed by moka
///
/// Used in tests and as a Redis-less fallback for single-instance
/// deployments.
pub struct MemoryCache {
    lists: moka::future::Cache<String, Arc<Vec<MatchScore>>>,
    pairs: moka::future::Cache<String, MatchScore>,
}

impl MemoryCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let lists = moka::future::CacheBuilder::new(capacity)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        let pairs = moka::future::CacheBuilder::new(capacity)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        Self { lists, pairs }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(10_000, Duration::from_secs(3600))
    }
}

impl MatchCache for MemoryCache {
    async fn get_candidate_list(
        &self,
        requester: &str,
        page: i32,
        size: i32,
    ) -> Option<Vec<MatchScore>> {
        let key = CacheKey::candidate_list(requester, page, size);
        self.lists.get(&key).await.map(|scores| (*scores).clone())
    }

    async fn put_candidate_list(
        &self,
        requester: &str,
        page: i32,
        size: i32,
        scores: &[MatchScore],
    ) {
        let key = CacheKey::candidate_list(requester, page, size);
        self.lists.insert(key, Arc::new(scores.to_vec())).await;
    }

    async fn get_pair_score(&self, requester: &str, candidate: &str) -> Option<MatchScore> {
        self.pairs.get(&CacheKey::pair_score(requester, candidate)).await
    }

    async fn put_pair_score(&self, requester: &str, candidate: &str, score: &MatchScore) {
        self.pairs
            .insert(CacheKey::pair_score(requester, candidate), score.clone())
            .await;
    }

    async fn evict_for_user(&self, user_id: &str) {
        let list_prefix = format!("matches:{}:", user_id);
        if let Err(e) = self
            .lists
            .invalidate_entries_if(move |key, _| key.starts_with(&list_prefix))
        {
            tracing::warn!("Failed to invalidate candidate lists: {}", e);
        }

        let pair_prefix = format!("score:{}:", user_id);
        let pair_suffix = format!(":{}", user_id);
        if let Err(e) = self.pairs.invalidate_entries_if(move |key, _| {
            key.starts_with(&pair_prefix) || key.ends_with(&pair_suffix)
        }) {
            tracing::warn!("Failed to invalidate pair scores: {}", e);
        }
    }

    async fn evict_all(&self) {
        self.lists.invalidate_all();
        self.pairs.invalidate_all();
    }
}

/// Two-tier cache: moka L1 in front of a shared Redis L2
///
/// L1 is fastest but per-instance, L2 is shared across instances.
/// Pattern eviction clears all of L1 and the matching Redis keys,
/// favouring correctness over hit-rate.
pub struct TieredCache {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl TieredCache {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        let l1 = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1,
            ttl_secs,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        if let Some(bytes) = self.l1.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        drop(conn);

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                self.l1.insert(key.to_string(), json.as_bytes().to_vec()).await;
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;

        self.l1.insert(key.to_string(), json.as_bytes().to_vec()).await;

        let mut conn = self.redis.lock().await;
        redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async::<()>(&mut *conn)
            .await?;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<(), CacheError> {
        let mut conn = self.redis.lock().await;
        let keys: Vec<String> = redis::cmd("KEYS").arg(pattern).query_async(&mut *conn).await?;

        if !keys.is_empty() {
            redis::cmd("DEL").arg(keys).query_async::<()>(&mut *conn).await?;
        }

        tracing::debug!("Invalidated cache pattern: {}", pattern);
        Ok(())
    }
}

impl MatchCache for TieredCache {
    async fn get_candidate_list(
        &self,
        requester: &str,
        page: i32,
        size: i32,
    ) -> Option<Vec<MatchScore>> {
        let key = CacheKey::candidate_list(requester, page, size);
        match self.get_json(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("Cache read failed for {}, treating as miss: {}", key, e);
                None
            }
        }
    }

    async fn put_candidate_list(
        &self,
        requester: &str,
        page: i32,
        size: i32,
        scores: &[MatchScore],
    ) {
        let key = CacheKey::candidate_list(requester, page, size);
        if let Err(e) = self.set_json(&key, &scores).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }
    }

    async fn get_pair_score(&self, requester: &str, candidate: &str) -> Option<MatchScore> {
        let key = CacheKey::pair_score(requester, candidate);
        match self.get_json(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("Cache read failed for {}, treating as miss: {}", key, e);
                None
            }
        }
    }

    async fn put_pair_score(&self, requester: &str, candidate: &str, score: &MatchScore) {
        let key = CacheKey::pair_score(requester, candidate);
        if let Err(e) = self.set_json(&key, score).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }
    }

    async fn evict_for_user(&self, user_id: &str) {
        // L1 cannot match patterns cheaply; clearing it wholesale is the
        // conservative choice
        self.l1.invalidate_all();

        for pattern in CacheKey::user_patterns(user_id) {
            if let Err(e) = self.delete_pattern(&pattern).await {
                tracing::warn!("Cache eviction failed for {}: {}", pattern, e);
            }
        }
    }

    async fn evict_all(&self) {
        self.l1.invalidate_all();
        for pattern in ["matches:*", "score:*"] {
            if let Err(e) = self.delete_pattern(pattern).await {
                tracing::warn!("Cache flush failed for {}: {}", pattern, e);
            }
        }
    }
}
