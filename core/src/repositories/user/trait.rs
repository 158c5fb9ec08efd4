//! User repository trait defining the interface to the external user store.
//!
//! The user store owns the profile data; the core only reads records,
//! updates account flags, and replaces the password hash.

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainResult;

/// Partial update of a user's account flags
///
/// Unset fields are left untouched by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagUpdate {
    pub is_active: Option<bool>,
    pub is_email_verified: Option<bool>,
    pub is_phone_verified: Option<bool>,
}

impl FlagUpdate {
    /// Set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }

    /// Set the email-verified flag
    pub fn with_email_verified(mut self, verified: bool) -> Self {
        self.is_email_verified = Some(verified);
        self
    }

    /// Set the phone-verified flag
    pub fn with_phone_verified(mut self, verified: bool) -> Self {
        self.is_phone_verified = Some(verified);
        self
    }
}

/// Repository trait for user persistence operations
///
/// Implementations handle the actual store access while maintaining the
/// abstraction boundary between the domain and infrastructure layers.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by email address
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Find a user by unique identifier
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;

    /// Apply a partial flag update and return the updated user
    async fn update_flags(&self, id: Uuid, flags: FlagUpdate) -> DomainResult<User>;

    /// Replace the stored password hash
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> DomainResult<()>;

    /// Record a successful login
    async fn update_last_login(&self, id: Uuid) -> DomainResult<()>;

    /// Names of the groups the user belongs to
    async fn group_names(&self, id: Uuid) -> DomainResult<HashSet<String>>;
}
