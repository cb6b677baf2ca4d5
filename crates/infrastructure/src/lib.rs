//! Infrastructure adapters for the Masthead authorization ports.

#![forbid(unsafe_code)]

mod in_memory_permission_cache;
mod redis_decision_store;

pub use in_memory_permission_cache::InMemoryPermissionCache;
pub use redis_decision_store::RedisDecisionStore;
