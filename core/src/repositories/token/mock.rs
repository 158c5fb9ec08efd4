//! In-memory mock implementation of the refresh token ledger for testing

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainResult;

use super::r#trait::RefreshTokenLedger;

/// Mock ledger backed by in-memory maps
///
/// Clones share the underlying storage.
#[derive(Clone)]
pub struct MockTokenLedger {
    pub outstanding: Arc<Mutex<HashMap<Uuid, RefreshTokenRecord>>>,
    pub blacklisted: Arc<Mutex<HashMap<Uuid, DateTime<Utc>>>>,
}

impl MockTokenLedger {
    pub fn new() -> Self {
        Self {
            outstanding: Arc::new(Mutex::new(HashMap::new())),
            blacklisted: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of outstanding records (test helper)
    pub fn outstanding_count(&self) -> usize {
        self.outstanding.lock().unwrap().len()
    }

    /// Number of blacklisted entries (test helper)
    pub fn blacklist_count(&self) -> usize {
        self.blacklisted.lock().unwrap().len()
    }
}

impl Default for MockTokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshTokenLedger for MockTokenLedger {
    async fn record_issued(&self, record: RefreshTokenRecord) -> DomainResult<RefreshTokenRecord> {
        let mut outstanding = self.outstanding.lock().unwrap();
        outstanding.insert(record.jti, record.clone());
        Ok(record)
    }

    async fn find(&self, jti: Uuid) -> DomainResult<Option<RefreshTokenRecord>> {
        let outstanding = self.outstanding.lock().unwrap();
        Ok(outstanding.get(&jti).cloned())
    }

    async fn blacklist(&self, jti: Uuid, expires_at: DateTime<Utc>) -> DomainResult<bool> {
        let mut blacklisted = self.blacklisted.lock().unwrap();
        if blacklisted.contains_key(&jti) {
            return Ok(false);
        }
        blacklisted.insert(jti, expires_at);
        Ok(true)
    }

    async fn is_blacklisted(&self, jti: Uuid) -> DomainResult<bool> {
        let blacklisted = self.blacklisted.lock().unwrap();
        Ok(blacklisted.contains_key(&jti))
    }

    async fn purge_expired(&self) -> DomainResult<usize> {
        let now = Utc::now();
        let mut removed = 0;

        let mut outstanding = self.outstanding.lock().unwrap();
        let before = outstanding.len();
        outstanding.retain(|_, record| record.expires_at > now);
        removed += before - outstanding.len();

        let mut blacklisted = self.blacklisted.lock().unwrap();
        let before = blacklisted.len();
        blacklisted.retain(|_, expires_at| *expires_at > now);
        removed += before - blacklisted.len();

        Ok(removed)
    }
}
