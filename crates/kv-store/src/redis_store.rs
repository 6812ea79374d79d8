//! Redis-backed store
//!
//! Uses a `ConnectionManager`, which multiplexes one connection and
//! reconnects on failure. Expiry is delegated to Redis (`SET .. EX`), and
//! `pop` maps to `GETDEL` (Redis 6.2+), so single-use reads are atomic
//! across replicas.

use std::time::Duration;

use redis::aio::ConnectionManager;
use tracing::info;

use crate::error::{Error, Result};
use crate::{KvStore, StoreFuture};

pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Open a client for `url` and establish the managed connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Connect(format!("invalid redis url: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;
        info!("connected to redis");
        Ok(Self { conn })
    }

    async fn run<T: redis::FromRedisValue>(
        &self,
        command: &'static str,
        cmd: redis::Cmd,
    ) -> Result<T> {
        let mut conn = self.conn.clone();
        cmd.query_async(&mut conn)
            .await
            .map_err(|e| Error::Command {
                command,
                message: e.to_string(),
            })
    }
}

/// Redis rejects `EX 0`; sub-second TTLs round up to one second.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// `<name> <key>`, the shape of GET, DEL and GETDEL.
fn key_cmd(name: &str, key: &str) -> redis::Cmd {
    let mut cmd = redis::cmd(name);
    cmd.arg(key);
    cmd
}

/// `SET <key> <value> EX <secs>`
fn set_cmd(key: &str, value: &str, ttl: Duration) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value).arg("EX").arg(ttl_secs(ttl));
    cmd
}

impl KvStore for RedisStore {
    fn backend(&self) -> &str {
        "redis"
    }

    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let cmd = key_cmd("GET", key);
            self.run("GET", cmd).await
        })
    }

    fn put<'a>(&'a self, key: &'a str, value: &'a str, ttl: Duration) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let cmd = set_cmd(key, value, ttl);
            self.run("SET", cmd).await
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let cmd = key_cmd("DEL", key);
            let _removed: i64 = self.run("DEL", cmd).await?;
            Ok(())
        })
    }

    fn pop<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let cmd = key_cmd("GETDEL", key);
            self.run("GETDEL", cmd).await
        })
    }
}
