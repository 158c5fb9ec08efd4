//! Login orchestration tests with mock collaborators

use std::sync::Arc;

use uuid::Uuid;

use vg_shared::config::{OtpConfig, ThrottleConfig};

use crate::domain::entities::user::{AuthProvider, User};
use crate::domain::value_objects::requests::{
    LoginRequest, LogoutRequest, RefreshRequest, ResendOtpRequest, SocialLoginRequest,
    TokenExchangeRequest,
};
use crate::errors::{AuthError, DomainError, OtpError, TokenError};
use crate::repositories::{MockTokenLedger, MockUserRepository};
use crate::services::auth::AuthService;
use crate::services::cache::MemoryCacheStore;
use crate::services::dispatch::MockDispatcher;
use crate::services::otp::OtpManager;
use crate::services::social::MockOAuthAdapter;
use crate::services::throttle::ThrottleGuard;
use crate::services::token::{Rs256KeyManager, TokenService, TokenServiceConfig};

const PRIVATE_PEM: &str = include_str!("../../../../keys/jwt_private_key.pem");
const PUBLIC_PEM: &str = include_str!("../../../../keys/jwt_public_key.pem");

// Low bcrypt cost keeps the tests fast
const TEST_BCRYPT_COST: u32 = 4;

type TestAuthService = AuthService<
    MockUserRepository,
    MemoryCacheStore,
    MockDispatcher,
    MockTokenLedger,
    MockOAuthAdapter,
>;

struct Fixture {
    users: MockUserRepository,
    cache: Arc<MemoryCacheStore>,
    dispatcher: Arc<MockDispatcher>,
    service: TestAuthService,
}

fn fixture_with(oauth: MockOAuthAdapter) -> Fixture {
    let users = MockUserRepository::new();
    let cache = Arc::new(MemoryCacheStore::new());
    let dispatcher = Arc::new(MockDispatcher::new());
    let ledger = MockTokenLedger::new();

    let key_manager =
        Rs256KeyManager::from_pem_strings(PRIVATE_PEM, PUBLIC_PEM).expect("test keys should load");
    let token_service = Arc::new(TokenService::new(
        ledger.clone(),
        TokenServiceConfig::default(),
        key_manager,
    ));

    let service = AuthService::new(
        Arc::new(users.clone()),
        OtpManager::new(cache.clone(), dispatcher.clone(), OtpConfig::default()),
        ThrottleGuard::new(cache.clone(), ThrottleConfig::default()),
        token_service,
        Arc::new(oauth),
    );

    Fixture {
        users,
        cache,
        dispatcher,
        service,
    }
}

fn fixture() -> Fixture {
    fixture_with(MockOAuthAdapter::unresolved())
}

fn seeded_user(groups: &[&str]) -> User {
    let hash = bcrypt::hash("TestP@ssw0rd", TEST_BCRYPT_COST).unwrap();
    let mut user = User::new("test@example.com".to_string(), hash);
    user.is_active = true;
    user.is_email_verified = true;
    user.group_names = groups.iter().map(|s| s.to_string()).collect();
    user
}

fn login_request() -> LoginRequest {
    LoginRequest {
        email: "test@example.com".to_string(),
        password: "TestP@ssw0rd".to_string(),
    }
}

#[tokio::test]
async fn test_login_dispatches_otp() {
    let fixture = fixture();
    let user = seeded_user(&[]);
    fixture.users.insert(user.clone());

    let ack = fixture.service.login(login_request()).await.unwrap();

    assert_eq!(ack.user_id, user.id);
    assert!(ack.otp_dispatched);
    assert_eq!(fixture.dispatcher.sent_count(), 1);
}

#[tokio::test]
async fn test_login_with_wrong_password_dispatches_nothing() {
    let fixture = fixture();
    fixture.users.insert(seeded_user(&[]));

    let error = fixture
        .service
        .login(LoginRequest {
            email: "test@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(error, DomainError::Auth(AuthError::InvalidCredentials));
    assert_eq!(fixture.dispatcher.sent_count(), 0);
}

#[tokio::test]
async fn test_login_with_malformed_email_is_a_validation_error() {
    let fixture = fixture();

    let error = fixture
        .service
        .login(LoginRequest {
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(error, DomainError::Validation { .. }));
}

#[tokio::test]
async fn test_second_login_within_window_is_throttled() {
    let fixture = fixture();
    fixture.users.insert(seeded_user(&[]));

    fixture.service.login(login_request()).await.unwrap();
    let error = fixture.service.login(login_request()).await.unwrap_err();

    match error {
        DomainError::Auth(AuthError::Throttled { retry_after }) => {
            assert!(retry_after > 0 && retry_after <= 60)
        }
        other => panic!("expected Throttled, got {:?}", other),
    }
    // The throttled attempt produced no duplicate dispatch
    assert_eq!(fixture.dispatcher.sent_count(), 1);
}

#[tokio::test]
async fn test_resend_shares_the_login_throttle_scope() {
    let fixture = fixture();
    let user = seeded_user(&[]);
    fixture.users.insert(user.clone());

    fixture.service.login(login_request()).await.unwrap();
    let error = fixture
        .service
        .resend_otp(ResendOtpRequest { user_id: user.id })
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        DomainError::Auth(AuthError::Throttled { .. })
    ));
}

#[tokio::test]
async fn test_resend_after_window_reissues_the_code() {
    let fixture = fixture();
    let user = seeded_user(&[]);
    fixture.users.insert(user.clone());

    fixture.service.login(login_request()).await.unwrap();
    fixture
        .cache
        .force_expire(&format!("throttle:otp:{}", user.id));

    let ack = fixture
        .service
        .resend_otp(ResendOtpRequest { user_id: user.id })
        .await
        .unwrap();

    assert!(ack.otp_dispatched);
    assert_eq!(fixture.dispatcher.sent_count(), 2);
}

#[tokio::test]
async fn test_resend_for_unknown_user_fails() {
    let fixture = fixture();

    let error = fixture
        .service
        .resend_otp(ResendOtpRequest {
            user_id: Uuid::new_v4(),
        })
        .await
        .unwrap_err();

    assert_eq!(error, DomainError::Auth(AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_exchange_yields_pair_with_current_role() {
    let fixture = fixture();
    let user = seeded_user(&["Admin"]);
    fixture.users.insert(user.clone());

    fixture.service.login(login_request()).await.unwrap();
    let code = fixture.dispatcher.last_code().unwrap();

    let pair = fixture
        .service
        .exchange_otp(TokenExchangeRequest {
            user_id: user.id,
            otp: code,
        })
        .await
        .unwrap();

    assert_eq!(pair.user_id, user.id);
    assert_eq!(pair.user_role.as_str(), "Admin");

    // Login timestamp was recorded
    let stored = fixture.users.users.lock().unwrap()[0].clone();
    assert!(stored.last_login_at.is_some());
}

#[tokio::test]
async fn test_exchange_with_wrong_code_fails() {
    let fixture = fixture();
    let user = seeded_user(&[]);
    fixture.users.insert(user.clone());

    fixture.service.login(login_request()).await.unwrap();
    let code = fixture.dispatcher.last_code().unwrap();
    let wrong = if code == "000000" { "000001" } else { "000000" };

    let error = fixture
        .service
        .exchange_otp(TokenExchangeRequest {
            user_id: user.id,
            otp: wrong.to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(error, DomainError::Otp(OtpError::InvalidOtp));
}

#[tokio::test]
async fn test_consumed_otp_cannot_be_exchanged_twice() {
    let fixture = fixture();
    let user = seeded_user(&[]);
    fixture.users.insert(user.clone());

    fixture.service.login(login_request()).await.unwrap();
    let code = fixture.dispatcher.last_code().unwrap();

    fixture
        .service
        .exchange_otp(TokenExchangeRequest {
            user_id: user.id,
            otp: code.clone(),
        })
        .await
        .unwrap();

    let error = fixture
        .service
        .exchange_otp(TokenExchangeRequest {
            user_id: user.id,
            otp: code,
        })
        .await
        .unwrap_err();

    assert_eq!(error, DomainError::Otp(OtpError::SessionExpired));
}

#[tokio::test]
async fn test_refresh_rotates_and_blacklists() {
    let fixture = fixture();
    let user = seeded_user(&[]);
    fixture.users.insert(user.clone());

    fixture.service.login(login_request()).await.unwrap();
    let code = fixture.dispatcher.last_code().unwrap();
    let pair = fixture
        .service
        .exchange_otp(TokenExchangeRequest {
            user_id: user.id,
            otp: code,
        })
        .await
        .unwrap();

    let rotated = fixture
        .service
        .refresh_token(RefreshRequest {
            refresh: pair.refresh_token.clone(),
        })
        .await
        .unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);

    // The predecessor is spent
    let error = fixture
        .service
        .refresh_token(RefreshRequest {
            refresh: pair.refresh_token,
        })
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Token(TokenError::TokenBlacklisted));
}

#[tokio::test]
async fn test_refresh_fails_when_user_no_longer_resolves() {
    let fixture = fixture();
    let user = seeded_user(&[]);
    fixture.users.insert(user.clone());

    fixture.service.login(login_request()).await.unwrap();
    let code = fixture.dispatcher.last_code().unwrap();
    let pair = fixture
        .service
        .exchange_otp(TokenExchangeRequest {
            user_id: user.id,
            otp: code,
        })
        .await
        .unwrap();

    fixture.users.users.lock().unwrap().clear();

    let error = fixture
        .service
        .refresh_token(RefreshRequest {
            refresh: pair.refresh_token,
        })
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Token(TokenError::TokenInvalid));
}

#[tokio::test]
async fn test_logout_blacklists_the_refresh_token() {
    let fixture = fixture();
    let user = seeded_user(&[]);
    fixture.users.insert(user.clone());

    fixture.service.login(login_request()).await.unwrap();
    let code = fixture.dispatcher.last_code().unwrap();
    let pair = fixture
        .service
        .exchange_otp(TokenExchangeRequest {
            user_id: user.id,
            otp: code,
        })
        .await
        .unwrap();

    fixture
        .service
        .logout(LogoutRequest {
            refresh: pair.refresh_token.clone(),
        })
        .await
        .unwrap();

    let error = fixture
        .service
        .refresh_token(RefreshRequest {
            refresh: pair.refresh_token,
        })
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Token(TokenError::TokenBlacklisted));
}

#[tokio::test]
async fn test_logout_requires_a_token() {
    let fixture = fixture();
    let error = fixture
        .service
        .logout(LogoutRequest {
            refresh: String::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Token(TokenError::MissingToken));
}

#[tokio::test]
async fn test_social_login_issues_pair_for_resolved_user() {
    let mut user = seeded_user(&["Admin"]);
    user.auth_provider = AuthProvider::Google;
    let fixture = fixture_with(MockOAuthAdapter::resolving(user.clone()));
    fixture.users.insert(user.clone());

    let pair = fixture
        .service
        .social_login(SocialLoginRequest {
            token: "provider-token".to_string(),
            provider: "google".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(pair.user_id, user.id);
}

#[tokio::test]
async fn test_social_login_rejects_inactive_account() {
    let mut user = seeded_user(&[]);
    user.auth_provider = AuthProvider::Google;
    user.is_active = false;
    let fixture = fixture_with(MockOAuthAdapter::resolving(user.clone()));
    fixture.users.insert(user);

    let error = fixture
        .service
        .social_login(SocialLoginRequest {
            token: "provider-token".to_string(),
            provider: "google".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(error, DomainError::Auth(AuthError::AccountInactive));
}

#[tokio::test]
async fn test_social_login_unresolved_is_invalid_credentials() {
    let fixture = fixture_with(MockOAuthAdapter::unresolved());

    let error = fixture
        .service
        .social_login(SocialLoginRequest {
            token: "provider-token".to_string(),
            provider: "google".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(error, DomainError::Auth(AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_social_login_surfaces_adapter_rejection() {
    let rejection = DomainError::Auth(AuthError::WrongProvider {
        provider: "email".to_string(),
    });
    let fixture = fixture_with(MockOAuthAdapter::rejecting(rejection.clone()));

    let error = fixture
        .service
        .social_login(SocialLoginRequest {
            token: "provider-token".to_string(),
            provider: "google".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(error, rejection);
}

#[tokio::test]
async fn test_social_login_with_unknown_provider_is_a_validation_error() {
    let fixture = fixture();

    let error = fixture
        .service
        .social_login(SocialLoginRequest {
            token: "provider-token".to_string(),
            provider: "myspace".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(error, DomainError::Validation { .. }));
}
