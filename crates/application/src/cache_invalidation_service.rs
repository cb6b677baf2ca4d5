//! Translates domain lifecycle events into cache invalidation.

use masthead_domain::{Resource, Role, UserId};

use crate::PermissionService;

/// Reacts to role, permission and user-lifecycle events by purging stale
/// cached decisions.
///
/// Handlers never surface errors: the business operation that triggered the
/// event has already been persisted, so invalidation failures are logged and
/// the expired-entry read guard picks up the slack.
#[derive(Clone)]
pub struct CacheInvalidationService {
    permission_service: PermissionService,
}

impl CacheInvalidationService {
    /// Creates an invalidation service over the permission service.
    #[must_use]
    pub fn new(permission_service: PermissionService) -> Self {
        Self { permission_service }
    }

    /// Handles a persisted role change by purging the user's cached
    /// decisions.
    pub async fn on_user_role_change(&self, user_id: &UserId, old_role: Role, new_role: Role) {
        match self.permission_service.invalidate_user_cache(user_id).await {
            Ok(removed) => tracing::debug!(
                user_id = %user_id,
                old_role = old_role.as_str(),
                new_role = new_role.as_str(),
                removed,
                "invalidated cached decisions after role change"
            ),
            Err(error) => tracing::warn!(
                user_id = %user_id,
                error = %error,
                "failed to invalidate user cache after role change"
            ),
        }
    }

    /// Handles an updated permission definition by purging every cached
    /// decision for the resource.
    pub async fn on_permission_update(&self, resource: Resource) {
        match self
            .permission_service
            .invalidate_resource_cache(resource)
            .await
        {
            Ok(removed) => tracing::debug!(
                resource = resource.as_str(),
                removed,
                "invalidated cached decisions after permission update"
            ),
            Err(error) => tracing::warn!(
                resource = resource.as_str(),
                error = %error,
                "failed to invalidate resource cache after permission update"
            ),
        }
    }

    /// Handles a user deactivation by purging the user's cached decisions.
    pub async fn on_user_deactivation(&self, user_id: &UserId) {
        match self.permission_service.invalidate_user_cache(user_id).await {
            Ok(removed) => tracing::debug!(
                user_id = %user_id,
                removed,
                "invalidated cached decisions after deactivation"
            ),
            Err(error) => tracing::warn!(
                user_id = %user_id,
                error = %error,
                "failed to invalidate user cache after deactivation"
            ),
        }
    }

    /// Proactively sweeps TTL-expired entries, returning the removed count.
    ///
    /// Reads already treat expired entries as misses; this only reclaims
    /// memory and may run on any schedule, or not at all.
    pub async fn cleanup_expired_entries(&self) -> u64 {
        match self
            .permission_service
            .remove_expired_cache_entries()
            .await
        {
            Ok(removed) => removed,
            Err(error) => {
                tracing::warn!(error = %error, "failed to sweep expired cache entries");
                0
            }
        }
    }
}
