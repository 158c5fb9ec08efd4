//! Federation seam for third-party OAuth providers

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entities::user::User;
use crate::errors::{DomainError, DomainResult};

/// Trait for the external OAuth adapter
///
/// `Ok(Some(user))` is a resolved account, `Ok(None)` means the provider
/// token did not resolve to anyone, and `Err` carries the adapter's own
/// rejection (for example a `WrongProvider` error when the email is
/// already registered with a password account).
#[async_trait]
pub trait OAuthAdapter: Send + Sync {
    async fn authenticate(&self, provider: &str, token: &str) -> DomainResult<Option<User>>;
}

/// Scripted adapter for tests
pub struct MockOAuthAdapter {
    outcome: Mutex<Option<DomainResult<Option<User>>>>,
}

impl MockOAuthAdapter {
    /// Adapter that resolves the given user
    pub fn resolving(user: User) -> Self {
        Self {
            outcome: Mutex::new(Some(Ok(Some(user)))),
        }
    }

    /// Adapter that resolves nobody
    pub fn unresolved() -> Self {
        Self {
            outcome: Mutex::new(Some(Ok(None))),
        }
    }

    /// Adapter that rejects with the given error
    pub fn rejecting(error: DomainError) -> Self {
        Self {
            outcome: Mutex::new(Some(Err(error))),
        }
    }
}

#[async_trait]
impl OAuthAdapter for MockOAuthAdapter {
    async fn authenticate(&self, _provider: &str, _token: &str) -> DomainResult<Option<User>> {
        self.outcome
            .lock()
            .unwrap()
            .clone()
            .expect("mock outcome not configured")
    }
}
