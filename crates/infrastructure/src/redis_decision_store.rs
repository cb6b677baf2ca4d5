//! Redis-backed distributed decision store.

use std::time::Duration;

use async_trait::async_trait;
use masthead_application::DistributedDecisionStore;
use masthead_core::{AppError, AppResult};
use redis::AsyncCommands;

/// Redis implementation of the distributed decision store port.
///
/// Keys are prefixed so multiple deployments can share one Redis instance.
/// Entry expiry is enforced by Redis itself via `SET ... EX`.
#[derive(Clone)]
pub struct RedisDecisionStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisDecisionStore {
    /// Creates a store adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    fn encode_decision(allowed: bool) -> &'static str {
        if allowed { "1" } else { "0" }
    }

    fn decode_decision(value: &str) -> AppResult<bool> {
        match value {
            "1" => Ok(true),
            "0" => Ok(false),
            _ => Err(AppError::Internal(format!(
                "invalid permission decision cache value '{value}'"
            ))),
        }
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl DistributedDecisionStore for RedisDecisionStore {
    async fn get(&self, key: &str) -> AppResult<Option<bool>> {
        let mut connection = self.connection().await?;

        let encoded: Option<String> = connection.get(self.key_for(key)).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to read permission decision cache entry: {error}"
            ))
        })?;

        encoded.as_deref().map(Self::decode_decision).transpose()
    }

    async fn set(&self, key: &str, allowed: bool, ttl: Duration) -> AppResult<()> {
        if ttl.is_zero() {
            return Ok(());
        }

        let mut connection = self.connection().await?;

        connection
            .set_ex(
                self.key_for(key),
                Self::encode_decision(allowed),
                ttl.as_secs().max(1),
            )
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to write permission decision cache entry: {error}"
                ))
            })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;

        let _removed: u64 = connection.del(self.key_for(key)).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to delete permission decision cache entry: {error}"
            ))
        })?;

        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> AppResult<u64> {
        let mut connection = self.connection().await?;
        let full_pattern = self.key_for(pattern);

        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(full_pattern.as_str())
                .arg("COUNT")
                .arg(100)
                .query_async(&mut connection)
                .await
                .map_err(|error| {
                    AppError::Internal(format!(
                        "failed to scan permission decision cache keys: {error}"
                    ))
                })?;

            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        if keys.is_empty() {
            return Ok(0);
        }

        connection.del(keys).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to delete permission decision cache entries: {error}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RedisDecisionStore;

    #[test]
    fn decisions_encode_as_single_characters() {
        assert_eq!(RedisDecisionStore::encode_decision(true), "1");
        assert_eq!(RedisDecisionStore::encode_decision(false), "0");
    }

    #[test]
    fn decode_accepts_only_known_values() {
        assert_eq!(RedisDecisionStore::decode_decision("1").ok(), Some(true));
        assert_eq!(RedisDecisionStore::decode_decision("0").ok(), Some(false));
        assert!(RedisDecisionStore::decode_decision("yes").is_err());
    }

    #[test]
    fn keys_are_prefixed() {
        let Ok(client) = redis::Client::open("redis://127.0.0.1/") else {
            panic!("client url should parse");
        };
        let store = RedisDecisionStore::new(client, "masthead:permissions");
        assert_eq!(
            store.key_for("products:read:any:alice"),
            "masthead:permissions:products:read:any:alice"
        );
    }
}
