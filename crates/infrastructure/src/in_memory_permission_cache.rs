use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use masthead_application::{
    CacheStats, DecisionCacheKey, DistributedDecisionStore, PermissionCache,
    PermissionCacheConfig,
};
use masthead_core::AppResult;
use masthead_domain::{Resource, UserId};
use tokio::sync::RwLock;


#[derive(Debug, Clone, Copy)]
struct DecisionEntry {
    allowed: bool,
    expires_at: Instant,
}

/// In-memory permission decision cache with lazy TTL expiry.
///
/// The read path never mutates shared state while holding the read lock;
/// expired entries are dropped under a write lock after a re-check. An
/// optional distributed tier is mirrored best-effort on every operation:
/// its failures are logged and never fail the local operation.
pub struct InMemoryPermissionCache {
    entries: RwLock<HashMap<DecisionCacheKey, DecisionEntry>>,
    config: PermissionCacheConfig,
    distributed: Option<Arc<dyn DistributedDecisionStore>>,
}

impl InMemoryPermissionCache {
    /// Creates an empty cache with the given configuration.
    #[must_use]
    pub fn new(config: PermissionCacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            distributed: None,
        }
    }

    /// Attaches a distributed tier mirrored on every operation.
    #[must_use]
    pub fn with_distributed(mut self, store: Arc<dyn DistributedDecisionStore>) -> Self {
        self.distributed = Some(store);
        self
    }

    async fn read_local(&self, key: &DecisionCacheKey) -> Option<bool> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key) {
                if entry.expires_at > Instant::now() {
                    return Some(entry.allowed);
                }
            } else {
                return None;
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }

        None
    }

    async fn insert_local(&self, key: DecisionCacheKey, allowed: bool) {
        let now = Instant::now();
        let expires_at = now.checked_add(self.config.ttl).unwrap_or(now);

        let mut entries = self.entries.write().await;

        if let Some(max_entries) = self.config.max_entries {
            if entries.len() >= max_entries && !entries.contains_key(&key) {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(key, DecisionEntry { allowed, expires_at });
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get(&self, key: &DecisionCacheKey) -> AppResult<Option<bool>> {
        if let Some(allowed) = self.read_local(key).await {
            return Ok(Some(allowed));
        }

        if let Some(store) = &self.distributed {
            match store.get(&key.storage_key()).await {
                Ok(Some(allowed)) => {
                    self.insert_local(key.clone(), allowed).await;
                    return Ok(Some(allowed));
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        "distributed decision store read failed, treating as miss"
                    );
                }
            }
        }

        Ok(None)
    }

    async fn set(&self, key: DecisionCacheKey, allowed: bool) -> AppResult<()> {
        if self.config.ttl.is_zero() {
            return Ok(());
        }

        let storage_key = key.storage_key();
        self.insert_local(key, allowed).await;

        if let Some(store) = &self.distributed {
            if let Err(error) = store.set(&storage_key, allowed, self.config.ttl).await {
                tracing::warn!(error = %error, "distributed decision store write failed");
            }
        }

        Ok(())
    }

    async fn invalidate_user(&self, user_id: &UserId) -> AppResult<u64> {
        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|key, _| key.user_id() != user_id);
            (before - entries.len()) as u64
        };

        if let Some(store) = &self.distributed {
            let pattern = DecisionCacheKey::user_match_pattern(user_id);
            if let Err(error) = store.delete_matching(&pattern).await {
                tracing::warn!(
                    user_id = %user_id,
                    error = %error,
                    "distributed decision store user invalidation failed"
                );
            }
        }

        Ok(removed)
    }

    async fn invalidate_resource(&self, resource: Resource) -> AppResult<u64> {
        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|key, _| key.resource() != resource);
            (before - entries.len()) as u64
        };

        if let Some(store) = &self.distributed {
            let pattern = DecisionCacheKey::resource_match_pattern(resource);
            if let Err(error) = store.delete_matching(&pattern).await {
                tracing::warn!(
                    resource = resource.as_str(),
                    error = %error,
                    "distributed decision store resource invalidation failed"
                );
            }
        }

        Ok(removed)
    }

    async fn clear(&self) -> AppResult<u64> {
        let removed = {
            let mut entries = self.entries.write().await;
            let removed = entries.len() as u64;
            entries.clear();
            removed
        };

        if let Some(store) = &self.distributed {
            if let Err(error) = store.delete_matching("*").await {
                tracing::warn!(error = %error, "distributed decision store clear failed");
            }
        }

        Ok(removed)
    }

    async fn remove_expired(&self) -> AppResult<u64> {
        // The distributed tier expires entries on its own.
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }

    async fn stats(&self) -> AppResult<CacheStats> {
        Ok(CacheStats {
            entries: self.entries.read().await.len(),
            ttl: self.config.ttl,
            max_entries: self.config.max_entries,
            distributed_enabled: self.distributed.is_some(),
        })
    }
}
