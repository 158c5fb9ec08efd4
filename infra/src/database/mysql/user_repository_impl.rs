//! MySQL implementation of the user repository

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::Row;
use uuid::Uuid;

use vg_core::domain::entities::user::{AuthProvider, User};
use vg_core::errors::{AuthError, DomainError, DomainResult};
use vg_core::repositories::{FlagUpdate, UserRepository};

/// User repository backed by MySQL via SQLx
///
/// User ids are stored as CHAR(36) UUID strings; group membership lives
/// in `auth_groups` / `user_groups` join tables.
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn db_error(context: &str, error: sqlx::Error) -> DomainError {
        DomainError::Internal {
            message: format!("{}: {}", context, error),
        }
    }

    fn row_to_user(row: &MySqlRow) -> DomainResult<User> {
        let id: String = row
            .try_get("id")
            .map_err(|e| Self::db_error("Failed to read user id", e))?;
        let id = Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
            message: format!("Malformed user id in store: {}", e),
        })?;

        let provider: String = row
            .try_get("auth_provider")
            .map_err(|e| Self::db_error("Failed to read auth provider", e))?;
        let auth_provider: AuthProvider =
            provider.parse().map_err(|e| DomainError::Internal {
                message: format!("Malformed auth provider in store: {}", e),
            })?;

        Ok(User {
            id,
            email: row
                .try_get("email")
                .map_err(|e| Self::db_error("Failed to read email", e))?,
            username: row
                .try_get("username")
                .map_err(|e| Self::db_error("Failed to read username", e))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(|e| Self::db_error("Failed to read password hash", e))?,
            phone_number: row
                .try_get("phone_number")
                .map_err(|e| Self::db_error("Failed to read phone number", e))?,
            is_active: row
                .try_get("is_active")
                .map_err(|e| Self::db_error("Failed to read flags", e))?,
            is_email_verified: row
                .try_get("is_email_verified")
                .map_err(|e| Self::db_error("Failed to read flags", e))?,
            is_phone_verified: row
                .try_get("is_phone_verified")
                .map_err(|e| Self::db_error("Failed to read flags", e))?,
            is_staff: row
                .try_get("is_staff")
                .map_err(|e| Self::db_error("Failed to read flags", e))?,
            is_superuser: row
                .try_get("is_superuser")
                .map_err(|e| Self::db_error("Failed to read flags", e))?,
            auth_provider,
            group_names: HashSet::new(),
            created_at: row
                .try_get("created_at")
                .map_err(|e| Self::db_error("Failed to read timestamps", e))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| Self::db_error("Failed to read timestamps", e))?,
            last_login_at: row
                .try_get("last_login_at")
                .map_err(|e| Self::db_error("Failed to read timestamps", e))?,
        })
    }

    async fn fetch_user(&self, column: &str, value: &str) -> DomainResult<Option<User>> {
        let query = format!(
            "SELECT id, email, username, password_hash, phone_number, \
             is_active, is_email_verified, is_phone_verified, is_staff, is_superuser, \
             auth_provider, created_at, updated_at, last_login_at \
             FROM users WHERE {} = ?",
            column
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to query user", e))?;

        match row {
            Some(row) => {
                let mut user = Self::row_to_user(&row)?;
                user.group_names = self.group_names(user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        self.fetch_user("email", email).await
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        self.fetch_user("id", &id.to_string()).await
    }

    async fn update_flags(&self, id: Uuid, flags: FlagUpdate) -> DomainResult<User> {
        sqlx::query(
            "UPDATE users SET \
             is_active = COALESCE(?, is_active), \
             is_email_verified = COALESCE(?, is_email_verified), \
             is_phone_verified = COALESCE(?, is_phone_verified), \
             updated_at = NOW() \
             WHERE id = ?",
        )
        .bind(flags.is_active)
        .bind(flags.is_email_verified)
        .bind(flags.is_phone_verified)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::db_error("Failed to update user flags", e))?;

        self.find_by_id(id)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(password_hash)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::db_error("Failed to update password hash", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::Auth(AuthError::InvalidCredentials));
        }
        Ok(())
    }

    async fn update_last_login(&self, id: Uuid) -> DomainResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to update last login", e))?;
        Ok(())
    }

    async fn group_names(&self, id: Uuid) -> DomainResult<HashSet<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT g.name FROM auth_groups g \
             INNER JOIN user_groups ug ON ug.group_id = g.id \
             WHERE ug.user_id = ?",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::db_error("Failed to query group membership", e))?;

        Ok(names.into_iter().collect())
    }
}
