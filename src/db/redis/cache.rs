use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Poster(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Poster(imdb_id) => write!(f, "poster:{}", imdb_id.to_lowercase()),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// JSON-valued Redis cache for external lookups
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connects through a managed connection that reconnects on failure
    pub async fn connect(client: Client) -> AppResult<Self> {
        let connection = ConnectionManager::new(client).await?;
        tracing::info!("Redis cache connected");
        Ok(Self { connection })
    }

    /// Attempts to retrieve and decode a cached value
    pub async fn get_from_cache<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let value = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                tracing::debug!(key = %key, "Cache hit");
                Ok(Some(value))
            }
            None => {
                tracing::debug!(key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Stores a value without making the caller wait for Redis
    pub fn set_in_background<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to serialize cache value");
                return;
            }
        };

        let key = key.to_string();
        let mut conn = self.connection.clone();
        tokio::spawn(async move {
            let result: redis::RedisResult<()> = conn.set_ex(&key, json, ttl).await;
            if let Err(e) = result {
                tracing::error!(key = %key, error = %e, "Failed to write to Redis cache");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_key_format() {
        let key = CacheKey::Poster("tt0114709".to_string());
        assert_eq!(key.to_string(), "poster:tt0114709");
    }

    #[test]
    fn test_poster_key_is_case_insensitive() {
        let upper = CacheKey::Poster("TT0114709".to_string());
        let lower = CacheKey::Poster("tt0114709".to_string());
        assert_eq!(upper.to_string(), lower.to_string());
    }

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not a url").is_err());
        assert!(create_redis_client("redis://localhost:6379").is_ok());
    }
}
