//! Key-value store abstraction for transient OAuth flow state
//!
//! The OAuth flow never owns long-lived state: state tokens and staged
//! credentials live in an external store with a TTL. `KvStore` is the seam,
//! with two implementations:
//! - `MemoryStore` for single-instance deployments and tests
//! - `RedisStore` for anything with more than one replica

pub mod error;
pub mod memory;
pub mod redis_store;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// String key-value store with per-key expiry.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn KvStore>`).
pub trait KvStore: Send + Sync {
    /// Backend name for logging and health reporting ("memory", "redis")
    fn backend(&self) -> &str;

    /// Read a value. Expired keys read as absent.
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    /// Write a value, replacing any previous one, expiring after `ttl`.
    fn put<'a>(&'a self, key: &'a str, value: &'a str, ttl: Duration) -> StoreFuture<'a, ()>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;

    /// Read and remove a key in one step.
    ///
    /// Backends should override this with an atomic operation. The default
    /// is a get followed by a delete, so two concurrent callers may both
    /// observe the value.
    fn pop<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let value = self.get(key).await?;
            if value.is_some() {
                self.delete(key).await?;
            }
            Ok(value)
        })
    }
}
