//! Poster lookup for recommended movies.
//!
//! Lookups run after ranking, one task per row, each bounded by a timeout.
//! Any failure leaves that row's poster empty; the ranked list itself is never
//! altered.
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::MovieSummary,
};

const POSTER_CACHE_TTL: u64 = 604800; // 1 week
const MISSING_POSTER: &str = "N/A";

/// Source of poster artwork keyed by IMDb id
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArtworkProvider: Send + Sync {
    /// Poster URL for `imdb_id`, `None` when the source has no artwork
    async fn poster_for(&self, imdb_id: &str) -> AppResult<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct OmdbTitle {
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

/// OMDb API provider
#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl OmdbProvider {
    pub fn new(api_key: String, api_url: String, cache: Option<Cache>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    async fn fetch_poster(&self, imdb_id: &str) -> AppResult<Option<String>> {
        let url = format!("{}/", self.api_url.trim_end_matches('/'));

        let response = self
            .http_client
            .get(&url)
            .query(&[("i", imdb_id), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "OMDb returned {} for {}",
                response.status(),
                imdb_id
            )));
        }

        let body: OmdbTitle = response.json().await?;
        if let Some(error) = body.error {
            tracing::debug!(imdb_id = %imdb_id, error = %error, "OMDb has no entry");
        }

        Ok(poster_url(body.poster))
    }
}

fn poster_url(raw: Option<String>) -> Option<String> {
    raw.map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && p != MISSING_POSTER)
}

#[async_trait::async_trait]
impl ArtworkProvider for OmdbProvider {
    async fn poster_for(&self, imdb_id: &str) -> AppResult<Option<String>> {
        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::Poster(imdb_id.to_string()),
                POSTER_CACHE_TTL,
                self.fetch_poster(imdb_id)
            ),
            None => self.fetch_poster(imdb_id).await,
        }
    }
}

/// Fills in `poster` for every row that has an IMDb id.
///
/// Rows keep their order. Without a provider every poster stays `None`.
pub async fn attach_posters(
    provider: Option<Arc<dyn ArtworkProvider>>,
    recommendations: &mut [MovieSummary],
    timeout: Duration,
) {
    let Some(provider) = provider else {
        return;
    };

    let mut tasks = JoinSet::new();

    for (idx, summary) in recommendations.iter().enumerate() {
        let Some(imdb_id) = summary.imdb_id.clone() else {
            continue;
        };
        let provider = provider.clone();
        tasks.spawn(async move {
            let poster = match tokio::time::timeout(timeout, provider.poster_for(&imdb_id)).await {
                Ok(Ok(poster)) => poster,
                Ok(Err(e)) => {
                    tracing::warn!(imdb_id = %imdb_id, error = %e, "Poster lookup failed");
                    None
                }
                Err(_) => {
                    tracing::warn!(imdb_id = %imdb_id, timeout_ms = timeout.as_millis(), "Poster lookup timed out");
                    None
                }
            };
            (idx, poster)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, poster)) => {
                if let Some(summary) = recommendations.get_mut(idx) {
                    summary.poster = poster;
                }
            }
            Err(e) => tracing::error!(error = %e, "Poster task join error"),
        }
    }
}
