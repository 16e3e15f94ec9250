use crate::core::engine::{MatchError, PhotoStore};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the media service
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),
}

impl From<PhotoError> for MatchError {
    fn from(value: PhotoError) -> Self {
        MatchError::StoreUnavailable(value.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct PrimaryPhotoResponse {
    url: String,
}

/// Client for the media service that stores profile photos
///
/// The matchmaking engine only ever needs one thing from it: the primary
/// photo URL for a user, which may legitimately not exist.
pub struct PhotoClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl PhotoClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Fetch the primary photo URL for a user, `None` if they have none
    pub async fn fetch_primary_url(&self, user_id: &str) -> Result<Option<String>, PhotoError> {
        let url = format!(
            "{}/v1/photos/primary?userId={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(user_id)
        );

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(PhotoError::ApiError(format!(
                "Failed to fetch primary photo: {}",
                response.status()
            )));
        }

        let body: PrimaryPhotoResponse = response.json().await?;
        Ok(Some(body.url))
    }
}

impl PhotoStore for PhotoClient {
    async fn primary_url(&self, user_id: &str) -> Result<Option<String>, MatchError> {
        self.fetch_primary_url(user_id).await.map_err(Into::into)
    }
}
