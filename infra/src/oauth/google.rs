//! Google OAuth adapter
//!
//! Validates provider-issued ID tokens against Google's tokeninfo
//! endpoint and resolves the verified email against the user store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use vg_core::domain::entities::user::{AuthProvider, User};
use vg_core::errors::{AuthError, DomainError, DomainResult};
use vg_core::repositories::UserRepository;
use vg_core::services::OAuthAdapter;
use vg_shared::utils::mask_email;

const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Google OAuth configuration
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    /// OAuth client id the token audience must match
    pub client_id: String,

    /// Token validation endpoint
    pub tokeninfo_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl GoogleOAuthConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, crate::InfrastructureError> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").map_err(|_| {
            crate::InfrastructureError::Config("GOOGLE_CLIENT_ID not set".to_string())
        })?;

        Ok(Self {
            client_id,
            tokeninfo_url: std::env::var("GOOGLE_TOKENINFO_URL")
                .unwrap_or_else(|_| DEFAULT_TOKENINFO_URL.to_string()),
            request_timeout_secs: 10,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    email: String,
    #[serde(default)]
    email_verified: Option<String>,
}

/// OAuth adapter validating Google ID tokens
pub struct GoogleOAuthAdapter<U: UserRepository> {
    http: reqwest::Client,
    users: Arc<U>,
    config: GoogleOAuthConfig,
}

impl<U: UserRepository> GoogleOAuthAdapter<U> {
    pub fn new(users: Arc<U>, config: GoogleOAuthConfig) -> Result<Self, crate::InfrastructureError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            users,
            config,
        })
    }

    async fn validate_token(&self, token: &str) -> DomainResult<Option<TokenInfo>> {
        let response = self
            .http
            .get(&self.config.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Token validation request failed: {}", e),
            })?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Provider rejected the token");
            return Ok(None);
        }

        let info: TokenInfo = response.json().await.map_err(|e| DomainError::Internal {
            message: format!("Malformed tokeninfo response: {}", e),
        })?;

        if info.aud != self.config.client_id {
            warn!(event = "oauth_audience_mismatch", "Token issued for another client");
            return Ok(None);
        }
        if info.email_verified.as_deref() != Some("true") {
            return Ok(None);
        }

        Ok(Some(info))
    }
}

#[async_trait]
impl<U: UserRepository> OAuthAdapter for GoogleOAuthAdapter<U> {
    async fn authenticate(&self, provider: &str, token: &str) -> DomainResult<Option<User>> {
        if provider != AuthProvider::Google.as_str() {
            return Err(DomainError::Validation {
                message: format!("Unsupported provider for this adapter: {}", provider),
            });
        }

        let info = match self.validate_token(token).await? {
            Some(info) => info,
            None => return Ok(None),
        };

        match self.users.find_by_email(&info.email).await? {
            Some(user) if user.auth_provider == AuthProvider::Google => {
                debug!(
                    email = %mask_email(&info.email),
                    "Resolved social login user"
                );
                Ok(Some(user))
            }
            Some(user) => {
                // The email belongs to an account from another provider
                Err(DomainError::Auth(AuthError::WrongProvider {
                    provider: user.auth_provider.to_string(),
                }))
            }
            None => Ok(None),
        }
    }
}
