//! Key/TTL cache store abstraction
//!
//! Every ephemeral artifact of the verification flows (pending logins,
//! phone OTPs, throttle markers) lives behind this trait. Keys are
//! namespaced per flow by the owning service; the store itself knows
//! nothing about other keys, and `set`/`delete` are atomic per key.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Trait for key/value cache integration with per-key time-to-live
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value by key, `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, String>;

    /// Set a value with an expiry in seconds
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String>;

    /// Delete a key, returning whether it existed
    ///
    /// The boolean is the fail-closed signal for consume races: a second
    /// delete of the same key observes `false`.
    async fn delete(&self, key: &str) -> Result<bool, String>;

    /// Check whether a key exists and has not expired
    async fn exists(&self, key: &str) -> Result<bool, String>;

    /// Remaining time-to-live in seconds, `None` if the key is absent
    async fn ttl(&self, key: &str) -> Result<Option<i64>, String>;
}

/// In-memory cache store for development and testing
///
/// Expiry is evaluated lazily on access, so entries linger physically
/// until touched but are never observable past their TTL.
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Force a key to expire immediately (test helper)
    pub fn force_expire(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(key) {
            entry.1 = Instant::now();
        }
    }

    fn is_live(expires_at: &Instant) -> bool {
        *expires_at > Instant::now()
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, expires_at)) if Self::is_live(expires_at) => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            (
                value.to_string(),
                Instant::now() + Duration::from_secs(ttl_seconds),
            ),
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.remove(key) {
            Some((_, expires_at)) => Ok(Self::is_live(&expires_at)),
            None => Ok(false),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, String> {
        Ok(self.get(key).await?.is_some())
    }

    async fn ttl(&self, key: &str) -> Result<Option<i64>, String> {
        let entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((_, expires_at)) if Self::is_live(expires_at) => {
                let remaining = expires_at.duration_since(Instant::now());
                // Round up so a freshly set window reports its full length
                Ok(Some(remaining.as_millis().div_ceil(1000) as i64))
            }
            _ => Ok(None),
        }
    }
}
