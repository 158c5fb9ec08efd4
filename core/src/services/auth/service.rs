//! Login orchestration service

use std::sync::Arc;

use validator::Validate;

use vg_shared::utils::mask_email;

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::AuthProvider;
use crate::domain::value_objects::requests::{
    validation_error, LoginRequest, LogoutRequest, RefreshRequest, ResendOtpRequest,
    SocialLoginRequest, TokenExchangeRequest,
};
use crate::domain::value_objects::responses::OtpDispatchAck;
use crate::errors::{AuthError, DomainError, DomainResult, OtpError, TokenError};
use crate::repositories::{RefreshTokenLedger, UserRepository};
use crate::services::cache::CacheStore;
use crate::services::dispatch::MessageDispatcher;
use crate::services::otp::OtpManager;
use crate::services::social::OAuthAdapter;
use crate::services::throttle::{ThrottleGuard, ThrottleScope};
use crate::services::token::TokenService;

use super::credentials::CredentialValidator;

/// Orchestrator of the login state machine and the token flows
///
/// A login moves through `AwaitingCredentials -> OtpPending ->
/// Authenticated`; the pending state lives entirely in the cache store,
/// so every request is handled independently.
pub struct AuthService<U, C, D, L, O>
where
    U: UserRepository,
    C: CacheStore,
    D: MessageDispatcher,
    L: RefreshTokenLedger,
    O: OAuthAdapter,
{
    users: Arc<U>,
    credentials: CredentialValidator<U>,
    otp_manager: OtpManager<C, D>,
    throttle: ThrottleGuard<C>,
    token_service: Arc<TokenService<L>>,
    oauth_adapter: Arc<O>,
}

impl<U, C, D, L, O> AuthService<U, C, D, L, O>
where
    U: UserRepository,
    C: CacheStore,
    D: MessageDispatcher,
    L: RefreshTokenLedger,
    O: OAuthAdapter,
{
    pub fn new(
        users: Arc<U>,
        otp_manager: OtpManager<C, D>,
        throttle: ThrottleGuard<C>,
        token_service: Arc<TokenService<L>>,
        oauth_adapter: Arc<O>,
    ) -> Self {
        Self {
            credentials: CredentialValidator::new(users.clone()),
            users,
            otp_manager,
            throttle,
            token_service,
            oauth_adapter,
        }
    }

    /// Start a login: validate credentials, then dispatch the OTP
    ///
    /// The throttle check runs after the credentials pass and before
    /// the dispatch, so a throttled login produces no duplicate code.
    pub async fn login(&self, request: LoginRequest) -> DomainResult<OtpDispatchAck> {
        // Step 1: Validate presence and shape of email and password
        request.validate().map_err(validation_error)?;

        // Step 2: Check credentials and account state
        let user = self
            .credentials
            .validate(&request.email, &request.password)
            .await?;

        // Step 3: Throttle OTP dispatches per user
        self.throttle
            .acquire(ThrottleScope::Otp, &user.id.to_string())
            .await?;

        // Step 4: Dispatch the code and cache the pending login
        self.otp_manager
            .start_login_session(&user, &request.password)
            .await?;

        tracing::info!(
            user_id = %user.id,
            email = %mask_email(&user.email),
            event = "login_otp_pending",
            "Login validated, OTP dispatched"
        );

        Ok(OtpDispatchAck {
            user_id: user.id,
            otp_dispatched: true,
        })
    }

    /// Re-dispatch the OTP of a pending login
    ///
    /// Re-resolves the user and re-checks account state independently
    /// of password re-entry; shares the `otp` throttle scope with the
    /// original login.
    pub async fn resend_otp(&self, request: ResendOtpRequest) -> DomainResult<OtpDispatchAck> {
        // Step 1: Re-resolve the user
        let user = self
            .users
            .find_by_id(request.user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        // Step 2: Re-check account state
        CredentialValidator::<U>::check_account_state(&user)?;

        // Step 3: Same throttle bucket as the login dispatch
        self.throttle
            .acquire(ThrottleScope::Otp, &user.id.to_string())
            .await?;

        // Step 4: Re-dispatch against the existing session
        self.otp_manager.reissue_login_otp(&user).await?;

        Ok(OtpDispatchAck {
            user_id: user.id,
            otp_dispatched: true,
        })
    }

    /// Exchange a pending login's OTP for a token pair
    ///
    /// The code is consumed atomically before any token is issued, so a
    /// replayed exchange observes the entry already gone and fails
    /// closed.
    pub async fn exchange_otp(&self, request: TokenExchangeRequest) -> DomainResult<TokenPair> {
        // Step 1: Validate presence of the OTP
        request.validate().map_err(validation_error)?;

        // Step 2: Verify and consume the code
        self.otp_manager
            .verify_login_otp(request.user_id, &request.otp)
            .await?;

        // Step 3: Re-validate the original credentials from the session
        let (email, password) = self.otp_manager.cached_credentials(request.user_id).await?;
        let user = self.credentials.validate(&email, &password).await?;
        if user.id != request.user_id {
            return Err(DomainError::Otp(OtpError::SessionExpired));
        }

        // Step 4: Record the login and issue the pair
        self.users.update_last_login(user.id).await?;
        let group_names = self.users.group_names(user.id).await?;
        let pair = self.token_service.issue_pair(&user, &group_names).await?;

        // Step 5: The pending login is complete
        self.otp_manager.clear_login_session(request.user_id).await;

        tracing::info!(
            user_id = %user.id,
            event = "login_authenticated",
            "OTP exchange completed"
        );

        Ok(pair)
    }

    /// Rotate a refresh token into a fresh pair
    ///
    /// Independent of the login states. The embedded user must still
    /// resolve; the role is recomputed from current group membership.
    pub async fn refresh_token(&self, request: RefreshRequest) -> DomainResult<TokenPair> {
        if request.refresh.trim().is_empty() {
            return Err(DomainError::Token(TokenError::MissingToken));
        }

        // Step 1: Check signature, lifetime, and kind
        let claims = self.token_service.decode_refresh_token(&request.refresh)?;
        let user_id = claims
            .subject()
            .map_err(|_| DomainError::Token(TokenError::TokenInvalid))?;

        // Step 2: The embedded user must still exist
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Token(TokenError::TokenInvalid))?;

        // Step 3: Blacklist-then-issue with the current role
        let group_names = self.users.group_names(user.id).await?;
        self.token_service
            .rotate(&request.refresh, &user, &group_names)
            .await
    }

    /// Authenticate with a third-party provider token
    pub async fn social_login(&self, request: SocialLoginRequest) -> DomainResult<TokenPair> {
        // Step 1: Validate presence of token and provider
        request.validate().map_err(validation_error)?;
        let provider: AuthProvider = request
            .provider
            .parse()
            .map_err(|message| DomainError::Validation { message })?;

        // Step 2: Delegate to the external adapter
        let user = self
            .oauth_adapter
            .authenticate(provider.as_str(), &request.token)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        // Step 3: Re-check account state
        if !user.is_active {
            return Err(DomainError::Auth(AuthError::AccountInactive));
        }

        // Step 4: Record the login and issue the pair
        self.users.update_last_login(user.id).await?;
        let group_names = self.users.group_names(user.id).await?;
        let pair = self.token_service.issue_pair(&user, &group_names).await?;

        tracing::info!(
            user_id = %user.id,
            provider = %provider,
            event = "social_login_authenticated",
            "Social login completed"
        );

        Ok(pair)
    }

    /// Revoke a refresh token on logout
    pub async fn logout(&self, request: LogoutRequest) -> DomainResult<()> {
        self.token_service.revoke(&request.refresh).await
    }
}
