//! In-process TTL store
//!
//! A tokio Mutex over a HashMap. Each entry carries an absolute deadline;
//! expired entries read as absent and are pruned lazily on every write.
//! Deadlines use `tokio::time::Instant` so tests can drive expiry with a
//! paused clock.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::{KvStore, StoreFuture};

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Single-process store. State is lost on restart and not shared between replicas.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn backend(&self) -> &str {
        "memory"
    }

    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let now = Instant::now();
            let mut entries = self.entries.lock().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
                Some(_) => {
                    entries.remove(key);
                    debug!(key, "expired entry dropped on read");
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }

    fn put<'a>(&'a self, key: &'a str, value: &'a str, ttl: Duration) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let now = Instant::now();
            let mut entries = self.entries.lock().await;
            entries.retain(|_, e| e.is_live(now));
            entries.insert(
                key.to_owned(),
                Entry {
                    value: value.to_owned(),
                    expires_at: now + ttl,
                },
            );
            debug!(key, ttl_secs = ttl.as_secs(), "stored entry");
            Ok(())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.entries.lock().await.remove(key);
            Ok(())
        })
    }

    fn pop<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let now = Instant::now();
            let removed = self.entries.lock().await.remove(key);
            Ok(removed.filter(|e| e.is_live(now)).map(|e| e.value))
        })
    }
}
