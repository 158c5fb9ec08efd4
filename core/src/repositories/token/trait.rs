//! Refresh token ledger trait.
//!
//! The ledger is the append-only record of issued refresh tokens plus
//! the blacklist consulted and extended during rotation and logout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainResult;

/// Persistence contract for the refresh token ledger
///
/// # Security Considerations
/// - Raw tokens are never stored; only their SHA-256 hash.
/// - `blacklist` must be a single atomic insert: of two concurrent
///   rotations of the same token, exactly one may observe `true`.
/// - Expired entries should be periodically purged.
#[async_trait]
pub trait RefreshTokenLedger: Send + Sync {
    /// Record a newly issued refresh token in the outstanding set
    async fn record_issued(&self, record: RefreshTokenRecord) -> DomainResult<RefreshTokenRecord>;

    /// Find an outstanding record by token ID
    async fn find(&self, jti: Uuid) -> DomainResult<Option<RefreshTokenRecord>>;

    /// Add a token ID to the blacklist
    ///
    /// Returns `true` when the entry was newly inserted, `false` when it
    /// was already blacklisted. The insert is first-wins.
    async fn blacklist(&self, jti: Uuid, expires_at: DateTime<Utc>) -> DomainResult<bool>;

    /// Check whether a token ID is blacklisted
    async fn is_blacklisted(&self, jti: Uuid) -> DomainResult<bool>;

    /// Remove expired outstanding and blacklist entries
    ///
    /// Returns the number of entries removed.
    async fn purge_expired(&self) -> DomainResult<usize>;
}
