//! Application services and ports for the Masthead authorization core.

#![forbid(unsafe_code)]

mod cache_invalidation_service;
mod permission_ports;
mod permission_service;

pub use cache_invalidation_service::CacheInvalidationService;
pub use permission_ports::{
    CacheStats, DEFAULT_DECISION_TTL, DecisionCacheKey, DistributedDecisionStore, PermissionCache,
    PermissionCacheConfig,
};
pub use permission_service::PermissionService;
