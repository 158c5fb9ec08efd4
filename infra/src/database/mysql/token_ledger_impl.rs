//! MySQL implementation of the refresh token ledger

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlPool;
use sqlx::Row;
use uuid::Uuid;

use vg_core::domain::entities::token::RefreshTokenRecord;
use vg_core::errors::{DomainError, DomainResult};
use vg_core::repositories::RefreshTokenLedger;

/// Refresh token ledger backed by MySQL via SQLx
///
/// Outstanding tokens live in `refresh_token_ledger`, the blacklist in
/// `refresh_token_blacklist` with a primary key on `jti`: the
/// `INSERT IGNORE` makes the blacklist insert an atomic first-wins
/// operation.
pub struct MySqlTokenLedger {
    pool: MySqlPool,
}

impl MySqlTokenLedger {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn db_error(context: &str, error: sqlx::Error) -> DomainError {
        DomainError::Internal {
            message: format!("{}: {}", context, error),
        }
    }
}

#[async_trait]
impl RefreshTokenLedger for MySqlTokenLedger {
    async fn record_issued(&self, record: RefreshTokenRecord) -> DomainResult<RefreshTokenRecord> {
        sqlx::query(
            "INSERT INTO refresh_token_ledger (jti, user_id, token_hash, issued_at, expires_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.jti.to_string())
        .bind(record.user_id.to_string())
        .bind(&record.token_hash)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::db_error("Failed to record refresh token", e))?;

        Ok(record)
    }

    async fn find(&self, jti: Uuid) -> DomainResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query(
            "SELECT jti, user_id, token_hash, issued_at, expires_at \
             FROM refresh_token_ledger WHERE jti = ?",
        )
        .bind(jti.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::db_error("Failed to query refresh token", e))?;

        row.map(|row| {
            let jti: String = row
                .try_get("jti")
                .map_err(|e| Self::db_error("Failed to read ledger row", e))?;
            let user_id: String = row
                .try_get("user_id")
                .map_err(|e| Self::db_error("Failed to read ledger row", e))?;

            Ok(RefreshTokenRecord {
                jti: Uuid::parse_str(&jti).map_err(|e| DomainError::Internal {
                    message: format!("Malformed jti in ledger: {}", e),
                })?,
                user_id: Uuid::parse_str(&user_id).map_err(|e| DomainError::Internal {
                    message: format!("Malformed user id in ledger: {}", e),
                })?,
                token_hash: row
                    .try_get("token_hash")
                    .map_err(|e| Self::db_error("Failed to read ledger row", e))?,
                issued_at: row
                    .try_get("issued_at")
                    .map_err(|e| Self::db_error("Failed to read ledger row", e))?,
                expires_at: row
                    .try_get("expires_at")
                    .map_err(|e| Self::db_error("Failed to read ledger row", e))?,
            })
        })
        .transpose()
    }

    async fn blacklist(&self, jti: Uuid, expires_at: DateTime<Utc>) -> DomainResult<bool> {
        let result = sqlx::query(
            "INSERT IGNORE INTO refresh_token_blacklist (jti, expires_at) VALUES (?, ?)",
        )
        .bind(jti.to_string())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::db_error("Failed to blacklist refresh token", e))?;

        // Zero affected rows means the entry already existed
        Ok(result.rows_affected() > 0)
    }

    async fn is_blacklisted(&self, jti: Uuid) -> DomainResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM refresh_token_blacklist WHERE jti = ?")
                .bind(jti.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| Self::db_error("Failed to query blacklist", e))?;

        Ok(count > 0)
    }

    async fn purge_expired(&self) -> DomainResult<usize> {
        let ledger = sqlx::query("DELETE FROM refresh_token_ledger WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to purge ledger", e))?;

        let blacklist = sqlx::query("DELETE FROM refresh_token_blacklist WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to purge blacklist", e))?;

        Ok((ledger.rows_affected() + blacklist.rows_affected()) as usize)
    }
}
