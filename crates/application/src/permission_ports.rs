//! Ports and shared types for permission decision caching.

use std::time::Duration;

use async_trait::async_trait;
use masthead_core::AppResult;
use masthead_domain::{Action, Permission, Resource, Scope, User, UserId};

/// Default lifetime of a cached permission decision.
pub const DEFAULT_DECISION_TTL: Duration = Duration::from_secs(300);

/// Key identifying one memoized permission decision.
///
/// Scope presence is part of the key: an unscoped request occupies a
/// different slot than a request scoped to `own` or `all`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecisionCacheKey {
    user_id: UserId,
    resource: Resource,
    action: Action,
    scope: Option<Scope>,
}

impl DecisionCacheKey {
    /// Creates a cache key from its parts.
    #[must_use]
    pub fn new(user_id: UserId, resource: Resource, action: Action, scope: Option<Scope>) -> Self {
        Self {
            user_id,
            resource,
            action,
            scope,
        }
    }

    /// Builds the key for a user's permission request.
    #[must_use]
    pub fn for_request(user: &User, permission: &Permission) -> Self {
        Self::new(
            user.id().clone(),
            permission.resource(),
            permission.action(),
            permission.scope(),
        )
    }

    /// Returns the user segment of the key.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the resource segment of the key.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Returns the action segment of the key.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns the scope segment of the key, if any.
    #[must_use]
    pub fn scope(&self) -> Option<Scope> {
        self.scope
    }

    /// Returns the stable string form used by distributed store tiers.
    ///
    /// The user id comes last: it is the only segment with a free alphabet,
    /// and user ids cannot contain `:`, so the form is unambiguous.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.resource.as_str(),
            self.action.as_str(),
            self.scope.map_or("any", |scope| scope.as_str()),
            self.user_id.as_str()
        )
    }

    /// Returns the glob matching every storage key of one user.
    #[must_use]
    pub fn user_match_pattern(user_id: &UserId) -> String {
        format!("*:{}", user_id.as_str())
    }

    /// Returns the glob matching every storage key of one resource.
    #[must_use]
    pub fn resource_match_pattern(resource: Resource) -> String {
        format!("{}:*", resource.as_str())
    }
}

/// Snapshot of decision cache occupancy and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in the local tier, including not-yet-swept expired
    /// ones.
    pub entries: usize,
    /// Configured entry lifetime.
    pub ttl: Duration,
    /// Configured size bound, if any.
    pub max_entries: Option<usize>,
    /// Whether a distributed tier is mirrored.
    pub distributed_enabled: bool,
}

/// Configuration for the permission decision cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionCacheConfig {
    /// Entry lifetime. Entries older than this are treated as absent.
    pub ttl: Duration,
    /// Optional bound on local entries; exceeding it evicts old entries.
    pub max_entries: Option<usize>,
}

impl Default for PermissionCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_DECISION_TTL,
            max_entries: None,
        }
    }
}

/// Cache port for memoized permission decisions.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns the unexpired cached decision for the key, if present.
    async fn get(&self, key: &DecisionCacheKey) -> AppResult<Option<bool>>;

    /// Stores a decision with a fresh timestamp.
    async fn set(&self, key: DecisionCacheKey, allowed: bool) -> AppResult<()>;

    /// Removes every entry belonging to the user. Returns the local removal
    /// count.
    async fn invalidate_user(&self, user_id: &UserId) -> AppResult<u64>;

    /// Removes every entry for the resource, across all users. Returns the
    /// local removal count.
    async fn invalidate_resource(&self, resource: Resource) -> AppResult<u64>;

    /// Removes all entries. Returns the local removal count.
    async fn clear(&self) -> AppResult<u64>;

    /// Sweeps expired entries. Reads already treat expired entries as
    /// misses; this only reclaims memory.
    async fn remove_expired(&self) -> AppResult<u64>;

    /// Returns cache occupancy and configuration.
    async fn stats(&self) -> AppResult<CacheStats>;
}

/// Key/value port for an external store shared between service instances.
///
/// Keys are the [`DecisionCacheKey::storage_key`] form. Implementations own
/// entry expiry; callers pass the desired lifetime on every write.
#[async_trait]
pub trait DistributedDecisionStore: Send + Sync {
    /// Reads a decision by storage key.
    async fn get(&self, key: &str) -> AppResult<Option<bool>>;

    /// Writes a decision with the given lifetime.
    async fn set(&self, key: &str, allowed: bool, ttl: Duration) -> AppResult<()>;

    /// Deletes one key.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Deletes every key matching a glob pattern. Returns the deleted count.
    async fn delete_matching(&self, pattern: &str) -> AppResult<u64>;
}

#[cfg(test)]
mod tests {
    use masthead_domain::{Action, Resource, Scope, UserId};

    use super::DecisionCacheKey;

    fn user_id(value: &str) -> UserId {
        match UserId::new(value) {
            Ok(id) => id,
            Err(_) => panic!("invalid test user id"),
        }
    }

    #[test]
    fn scope_presence_changes_the_storage_key() {
        let unscoped = DecisionCacheKey::new(
            user_id("alice"),
            Resource::Products,
            Action::Read,
            None,
        );
        let own = DecisionCacheKey::new(
            user_id("alice"),
            Resource::Products,
            Action::Read,
            Some(Scope::Own),
        );
        let all = DecisionCacheKey::new(
            user_id("alice"),
            Resource::Products,
            Action::Read,
            Some(Scope::All),
        );

        assert_eq!(unscoped.storage_key(), "products:read:any:alice");
        assert_eq!(own.storage_key(), "products:read:own:alice");
        assert_eq!(all.storage_key(), "products:read:all:alice");
        assert_ne!(unscoped, own);
        assert_ne!(own, all);
    }

    #[test]
    fn match_patterns_cover_the_storage_key_form() {
        let key = DecisionCacheKey::new(
            user_id("alice"),
            Resource::Products,
            Action::Read,
            Some(Scope::Own),
        );

        assert!(key.storage_key().ends_with(":alice"));
        assert_eq!(
            DecisionCacheKey::user_match_pattern(key.user_id()),
            "*:alice"
        );
        assert_eq!(
            DecisionCacheKey::resource_match_pattern(Resource::Products),
            "products:*"
        );
    }
}
