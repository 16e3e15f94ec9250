use crate::core::engine::{MatchError, ProfileStore, SkillStore};
use crate::models::{Gender, Profile, SkillAssignment};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

impl From<StoreError> for MatchError {
    fn from(value: StoreError) -> Self {
        MatchError::StoreUnavailable(value.to_string())
    }
}

/// PostgreSQL client for accounts, profiles and skill assignments
///
/// This is the relational store the matchmaking engine reads from; the
/// engine never writes through it.
pub struct PostgresClient {
    pool: PgPool,
}

const PROFILE_COLUMNS: &str = r#"
    p.id, p.display_name, p.bio, p.gender, p.date_of_birth,
    p.latitude, p.longitude, p.experience_yrs,
    COALESCE(
        array_agg(i.interest) FILTER (WHERE i.interest IS NOT NULL),
        '{}'
    ) AS interests
"#;

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    pub async fn account_exists(&self, user_id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM account WHERE id = $1) AS present")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("present"))
    }

    /// Fetch one profile with its interests aggregated in
    pub async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let query = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM profile p
            LEFT JOIN profile_interests i ON i.profile_id = p.id
            WHERE p.id = $1
            GROUP BY p.id
            "#
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_profile).transpose()
    }

    /// One page of all profiles except the given user, id ascending
    ///
    /// The fixed ordering keeps pagination deterministic: identical
    /// requests against unchanged data always see the same page.
    pub async fn fetch_profiles_excluding(
        &self,
        user_id: &str,
        page: i32,
        size: i32,
    ) -> Result<Vec<Profile>, StoreError> {
        let query = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM profile p
            LEFT JOIN profile_interests i ON i.profile_id = p.id
            WHERE p.id <> $1
            GROUP BY p.id
            ORDER BY p.id ASC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(size as i64)
            .bind((page as i64) * (size as i64))
            .fetch_all(&self.pool)
            .await?;

        let profiles = rows
            .into_iter()
            .map(row_to_profile)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Fetched {} candidate profiles for user {} (page {}, size {})",
            profiles.len(),
            user_id,
            page,
            size
        );

        Ok(profiles)
    }

    pub async fn fetch_skills(&self, user_id: &str) -> Result<Vec<SkillAssignment>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT skill_id, level
            FROM user_skill
            WHERE user_id = $1
            ORDER BY skill_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SkillAssignment {
                skill_id: row.get("skill_id"),
                level: row.get("level"),
            })
            .collect())
    }

    pub async fn fetch_skill_names(
        &self,
        ids: &[i32],
    ) -> Result<HashMap<i32, String>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query("SELECT id, name FROM skill WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| (row.get("id"), row.get("name")))
            .collect())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn row_to_profile(row: sqlx::postgres::PgRow) -> Result<Profile, StoreError> {
    let gender = row
        .get::<Option<String>, _>("gender")
        .map(|raw| Gender::from_str(&raw))
        .transpose()
        .map_err(StoreError::InvalidRow)?;

    Ok(Profile {
        id: row.get("id"),
        display_name: row.get("display_name"),
        bio: row.get("bio"),
        gender,
        date_of_birth: row.get("date_of_birth"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        experience_yrs: row.get("experience_yrs"),
        interests: row.get("interests"),
    })
}

impl ProfileStore for PostgresClient {
    async fn account_exists(&self, user_id: &str) -> Result<bool, MatchError> {
        PostgresClient::account_exists(self, user_id).await.map_err(Into::into)
    }

    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, MatchError> {
        self.fetch_profile(user_id).await.map_err(Into::into)
    }

    async fn profiles_excluding(
        &self,
        user_id: &str,
        page: i32,
        size: i32,
    ) -> Result<Vec<Profile>, MatchError> {
        self.fetch_profiles_excluding(user_id, page, size)
            .await
            .map_err(Into::into)
    }
}

impl SkillStore for PostgresClient {
    async fn skills_for_user(&self, user_id: &str) -> Result<Vec<SkillAssignment>, MatchError> {
        self.fetch_skills(user_id).await.map_err(Into::into)
    }

    async fn names_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, String>, MatchError> {
        self.fetch_skill_names(ids).await.map_err(Into::into)
    }
}
