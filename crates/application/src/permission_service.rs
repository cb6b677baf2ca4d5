//! Permission service orchestrating the matcher, the decision cache and the
//! route permission resolver.

use std::sync::Arc;

use masthead_core::{AppError, AppResult};
use masthead_domain::{
    Action, Permission, Resource, RolePermissionTable, RouteTable, Scope, User, UserId,
};

use crate::permission_ports::{CacheStats, DecisionCacheKey, PermissionCache};

mod management;
mod roles;
mod route_access;


/// Application service for permission checks.
///
/// Holds the immutable role and route tables plus the decision cache. Cheap
/// to clone; construct one per process and pass it to consumers explicitly.
#[derive(Clone)]
pub struct PermissionService {
    table: Arc<RolePermissionTable>,
    routes: Arc<RouteTable>,
    cache: Arc<dyn PermissionCache>,
}

impl PermissionService {
    /// Creates a permission service from its injected dependencies.
    #[must_use]
    pub fn new(
        table: Arc<RolePermissionTable>,
        routes: Arc<RouteTable>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        Self {
            table,
            routes,
            cache,
        }
    }

    /// Returns the injected route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Evaluates a permission synchronously against the role table, bypassing
    /// the cache.
    ///
    /// Pure and non-blocking; suitable for rendering decisions where the
    /// caller cannot await.
    #[must_use]
    pub fn evaluate(&self, user: Option<&User>, permission: &Permission) -> bool {
        self.table.evaluate(user, permission)
    }

    /// Returns whether the user holds the permission, consulting the cache
    /// first and memoizing the computed decision.
    ///
    /// Cache backend failures are logged and degrade to recomputation; a
    /// permission check never fails because the cache is unavailable.
    pub async fn has_permission(&self, user: Option<&User>, permission: &Permission) -> bool {
        let Some(user) = user else {
            return false;
        };

        let key = DecisionCacheKey::for_request(user, permission);
        match self.cache.get(&key).await {
            Ok(Some(decision)) => return decision,
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(
                    user_id = %user.id(),
                    permission = %permission,
                    error = %error,
                    "permission cache read failed, recomputing"
                );
            }
        }

        let decision = self.table.evaluate(Some(user), permission);

        if let Err(error) = self.cache.set(key, decision).await {
            tracing::warn!(
                user_id = %user.id(),
                permission = %permission,
                error = %error,
                "permission cache write failed"
            );
        }

        decision
    }

    /// Convenience wrapper building a [`Permission`] before checking it.
    pub async fn has_resource_access(
        &self,
        user: Option<&User>,
        resource: Resource,
        action: Action,
        scope: Option<Scope>,
    ) -> bool {
        let permission = match scope {
            Some(scope) => Permission::scoped(resource, action, scope),
            None => Permission::new(resource, action),
        };

        self.has_permission(user, &permission).await
    }

    /// Ensures the user holds the permission, returning a denial reason
    /// suitable for middleware logging otherwise.
    pub async fn require_permission(
        &self,
        user: Option<&User>,
        permission: &Permission,
    ) -> AppResult<()> {
        if self.has_permission(user, permission).await {
            return Ok(());
        }

        let reason = self
            .deny_reason(user, permission)
            .unwrap_or_else(|| format!("permission '{permission}' denied"));
        Err(AppError::Forbidden(reason))
    }

    /// Returns a human-readable denial reason, or `None` when access would
    /// be granted.
    ///
    /// Evaluates the matcher directly without touching the cache.
    #[must_use]
    pub fn deny_reason(&self, user: Option<&User>, permission: &Permission) -> Option<String> {
        let Some(user) = user else {
            return Some(format!("authentication required for '{permission}'"));
        };

        if !user.is_active() {
            return Some(format!("account '{}' is deactivated", user.id()));
        }

        if self.table.evaluate(Some(user), permission) {
            return None;
        }

        Some(format!(
            "subject '{}' with role '{}' is missing permission '{permission}'",
            user.id(),
            user.role().as_str()
        ))
    }

    /// Removes every cached decision for the user.
    pub async fn invalidate_user_cache(&self, user_id: &UserId) -> AppResult<u64> {
        self.cache.invalidate_user(user_id).await
    }

    /// Removes every cached decision for the resource, across all users.
    pub async fn invalidate_resource_cache(&self, resource: Resource) -> AppResult<u64> {
        self.cache.invalidate_resource(resource).await
    }

    /// Removes all cached decisions.
    pub async fn clear_cache(&self) -> AppResult<u64> {
        self.cache.clear().await
    }

    /// Sweeps expired cache entries, returning the removed count.
    pub async fn remove_expired_cache_entries(&self) -> AppResult<u64> {
        self.cache.remove_expired().await
    }

    /// Returns cache occupancy and configuration.
    pub async fn cache_stats(&self) -> AppResult<CacheStats> {
        self.cache.stats().await
    }
}
