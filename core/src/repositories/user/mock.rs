//! In-memory mock implementation of the user repository for testing

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, DomainResult};

use super::r#trait::{FlagUpdate, UserRepository};

/// Mock user repository backed by an in-memory vector
///
/// Clones share the underlying storage.
#[derive(Clone)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_existing_user(user: User) -> Self {
        let repo = Self::new();
        repo.users.lock().unwrap().push(user);
        repo
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_flags(&self, id: Uuid, flags: FlagUpdate) -> DomainResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        if let Some(active) = flags.is_active {
            user.is_active = active;
        }
        if let Some(verified) = flags.is_email_verified {
            user.is_email_verified = verified;
        }
        if let Some(verified) = flags.is_phone_verified {
            user.is_phone_verified = verified;
        }
        user.updated_at = chrono::Utc::now();

        Ok(user.clone())
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> DomainResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn update_last_login(&self, id: Uuid) -> DomainResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;
        user.update_last_login();
        Ok(())
    }

    async fn group_names(&self, id: Uuid) -> DomainResult<HashSet<String>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.group_names.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_by_email() {
        let user = User::new("test@example.com".to_string(), "hash".to_string());
        let repo = MockUserRepository::with_existing_user(user.clone());

        let found = repo.find_by_email("test@example.com").await.unwrap();
        assert_eq!(found, Some(user));

        let missing = repo.find_by_email("other@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_flags_is_partial() {
        let user = User::new("test@example.com".to_string(), "hash".to_string());
        let id = user.id;
        let repo = MockUserRepository::with_existing_user(user);

        let updated = repo
            .update_flags(id, FlagUpdate::default().with_active(true))
            .await
            .unwrap();

        assert!(updated.is_active);
        assert!(!updated.is_email_verified);
    }

    #[tokio::test]
    async fn test_set_password_hash() {
        let user = User::new("test@example.com".to_string(), "old".to_string());
        let id = user.id;
        let repo = MockUserRepository::with_existing_user(user);

        repo.set_password_hash(id, "new").await.unwrap();
        let user = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new");
    }
}
