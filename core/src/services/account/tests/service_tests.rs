//! Account sub-flow tests with mock collaborators

use std::sync::Arc;

use uuid::Uuid;

use vg_shared::config::{OtpConfig, SignedLinkConfig, ThrottleConfig};

use crate::domain::entities::user::{AuthProvider, User};
use crate::domain::value_objects::requests::{
    EmailRequest, LinkVerifyRequest, PasswordResetFinishRequest, PhoneOtpRequest,
};
use crate::errors::{AuthError, DomainError, LinkError, OtpError, PasswordError, PasswordRule};
use crate::repositories::MockUserRepository;
use crate::services::account::AccountFlowService;
use crate::services::cache::MemoryCacheStore;
use crate::services::dispatch::MockDispatcher;
use crate::services::link::SignedLinkService;
use crate::services::otp::OtpManager;
use crate::services::throttle::ThrottleGuard;

// Low bcrypt cost keeps the tests fast
const TEST_BCRYPT_COST: u32 = 4;

type TestAccountService =
    AccountFlowService<MockUserRepository, MemoryCacheStore, MockDispatcher>;

struct Fixture {
    users: MockUserRepository,
    dispatcher: Arc<MockDispatcher>,
    service: TestAccountService,
}

fn fixture() -> Fixture {
    let users = MockUserRepository::new();
    let cache = Arc::new(MemoryCacheStore::new());
    let dispatcher = Arc::new(MockDispatcher::new());
    let link_config = SignedLinkConfig {
        secret: "test-secret".to_string(),
        ..Default::default()
    };

    let service = AccountFlowService::new(
        Arc::new(users.clone()),
        ThrottleGuard::new(cache.clone(), ThrottleConfig::default()),
        OtpManager::new(cache.clone(), dispatcher.clone(), OtpConfig::default()),
        SignedLinkService::new(&link_config),
        dispatcher.clone(),
        link_config.frontend_url.clone(),
    );

    Fixture {
        users,
        dispatcher,
        service,
    }
}

fn unverified_user() -> User {
    let hash = bcrypt::hash("TestP@ssw0rd", TEST_BCRYPT_COST).unwrap();
    User::new("test@example.com".to_string(), hash)
}

fn verified_user() -> User {
    let mut user = unverified_user();
    user.is_active = true;
    user.is_email_verified = true;
    user
}

fn email_request() -> EmailRequest {
    EmailRequest {
        email: "test@example.com".to_string(),
    }
}

/// Pull the token and expiry back out of a dispatched link payload
fn extract_link(payload: &str) -> (String, String) {
    let token_start = payload.find("token=").unwrap() + "token=".len();
    let token_end = payload[token_start..].find('&').unwrap() + token_start;
    let token = payload[token_start..token_end].to_string();

    let expiry_start = payload.find("expiry=").unwrap() + "expiry=".len();
    let expiry = payload[expiry_start..].to_string();

    (token, expiry)
}

fn link_request(token: &str, expiry: &str) -> LinkVerifyRequest {
    LinkVerifyRequest {
        token: Some(token.to_string()),
        expiry: Some(expiry.to_string()),
    }
}

#[tokio::test]
async fn test_email_verification_roundtrip() {
    let fixture = fixture();
    let user = unverified_user();
    fixture.users.insert(user.clone());

    let ack = fixture
        .service
        .start_email_verification(email_request())
        .await
        .unwrap();
    assert!(ack.link_dispatched);

    let payload = fixture.dispatcher.last_payload().unwrap();
    let (token, expiry) = extract_link(&payload);
    fixture
        .service
        .finish_email_verification(link_request(&token, &expiry))
        .await
        .unwrap();

    let stored = fixture.users.users.lock().unwrap()[0].clone();
    assert!(stored.is_active);
    assert!(stored.is_email_verified);
}

#[tokio::test]
async fn test_email_verification_rejects_verified_account() {
    let fixture = fixture();
    fixture.users.insert(verified_user());

    let error = fixture
        .service
        .start_email_verification(email_request())
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Auth(AuthError::AlreadyVerified));
}

#[tokio::test]
async fn test_email_verification_rejects_social_account() {
    let fixture = fixture();
    let mut user = unverified_user();
    user.auth_provider = AuthProvider::Google;
    fixture.users.insert(user);

    let error = fixture
        .service
        .start_email_verification(email_request())
        .await
        .unwrap_err();
    assert_eq!(
        error,
        DomainError::Auth(AuthError::WrongProvider {
            provider: "google".to_string()
        })
    );
}

#[tokio::test]
async fn test_email_verification_start_is_throttled() {
    let fixture = fixture();
    fixture.users.insert(unverified_user());

    fixture
        .service
        .start_email_verification(email_request())
        .await
        .unwrap();
    let error = fixture
        .service
        .start_email_verification(email_request())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        DomainError::Auth(AuthError::Throttled { .. })
    ));
    assert_eq!(fixture.dispatcher.sent_count(), 1);
}

#[tokio::test]
async fn test_email_verification_finish_requires_both_parameters() {
    let fixture = fixture();

    let error = fixture
        .service
        .finish_email_verification(LinkVerifyRequest::default())
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Link(LinkError::MissingLink));
}

#[tokio::test]
async fn test_email_link_fails_when_user_disappears() {
    let fixture = fixture();
    fixture.users.insert(unverified_user());

    fixture
        .service
        .start_email_verification(email_request())
        .await
        .unwrap();
    let payload = fixture.dispatcher.last_payload().unwrap();
    let (token, expiry) = extract_link(&payload);

    fixture.users.users.lock().unwrap().clear();

    let error = fixture
        .service
        .finish_email_verification(link_request(&token, &expiry))
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Link(LinkError::InvalidLink));
}

#[tokio::test]
async fn test_password_reset_requires_verified_active_account() {
    let fixture = fixture();
    fixture.users.insert(unverified_user());

    let error = fixture
        .service
        .start_password_reset(email_request())
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Auth(AuthError::AccountInactive));
}

#[tokio::test]
async fn test_password_reset_check_returns_embedded_email() {
    let fixture = fixture();
    fixture.users.insert(verified_user());

    fixture
        .service
        .start_password_reset(email_request())
        .await
        .unwrap();
    let payload = fixture.dispatcher.last_payload().unwrap();
    let (token, expiry) = extract_link(&payload);

    let check = fixture
        .service
        .check_password_reset_link(link_request(&token, &expiry))
        .await
        .unwrap();
    assert_eq!(check.email, "test@example.com");
}

#[tokio::test]
async fn test_email_verify_token_is_useless_for_password_reset() {
    let fixture = fixture();
    fixture.users.insert(unverified_user());

    fixture
        .service
        .start_email_verification(email_request())
        .await
        .unwrap();
    let payload = fixture.dispatcher.last_payload().unwrap();
    let (token, expiry) = extract_link(&payload);

    let error = fixture
        .service
        .check_password_reset_link(link_request(&token, &expiry))
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Link(LinkError::InvalidLink));
}

async fn reset_link(fixture: &Fixture) -> (String, String) {
    fixture
        .service
        .start_password_reset(email_request())
        .await
        .unwrap();
    let payload = fixture.dispatcher.last_payload().unwrap();
    extract_link(&payload)
}

#[tokio::test]
async fn test_password_reset_rejects_mismatched_passwords() {
    let fixture = fixture();
    fixture.users.insert(verified_user());
    let (token, expiry) = reset_link(&fixture).await;

    let error = fixture
        .service
        .finish_password_reset(PasswordResetFinishRequest {
            token: Some(token),
            expiry: Some(expiry),
            password: "NewP@ssw0rd".to_string(),
            c_password: "OtherP@ssw0rd".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Password(PasswordError::PasswordMismatch));
}

#[tokio::test]
async fn test_password_reset_rejects_current_password() {
    let fixture = fixture();
    fixture.users.insert(verified_user());
    let (token, expiry) = reset_link(&fixture).await;

    let error = fixture
        .service
        .finish_password_reset(PasswordResetFinishRequest {
            token: Some(token),
            expiry: Some(expiry),
            password: "TestP@ssw0rd".to_string(),
            c_password: "TestP@ssw0rd".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Password(PasswordError::SamePassword));
}

#[tokio::test]
async fn test_password_reset_reports_all_weak_rules() {
    let fixture = fixture();
    fixture.users.insert(verified_user());
    let (token, expiry) = reset_link(&fixture).await;

    let error = fixture
        .service
        .finish_password_reset(PasswordResetFinishRequest {
            token: Some(token),
            expiry: Some(expiry),
            password: "weak".to_string(),
            c_password: "weak".to_string(),
        })
        .await
        .unwrap_err();

    match error {
        DomainError::Password(PasswordError::PasswordTooWeak { rules }) => {
            let expected = [
                PasswordRule::Short,
                PasswordRule::Upper,
                PasswordRule::Number,
                PasswordRule::Special,
            ]
            .into_iter()
            .collect();
            assert_eq!(rules, expected);
        }
        other => panic!("expected PasswordTooWeak, got {:?}", other),
    }
}

#[tokio::test]
async fn test_password_reset_replaces_the_hash() {
    let fixture = fixture();
    fixture.users.insert(verified_user());
    let (token, expiry) = reset_link(&fixture).await;

    fixture
        .service
        .finish_password_reset(PasswordResetFinishRequest {
            token: Some(token),
            expiry: Some(expiry),
            password: "NewP@ssw0rd".to_string(),
            c_password: "NewP@ssw0rd".to_string(),
        })
        .await
        .unwrap();

    let stored = fixture.users.users.lock().unwrap()[0].clone();
    assert!(bcrypt::verify("NewP@ssw0rd", &stored.password_hash).unwrap());
    assert!(!bcrypt::verify("TestP@ssw0rd", &stored.password_hash).unwrap());
}

#[tokio::test]
async fn test_phone_verification_roundtrip() {
    let fixture = fixture();
    let mut user = verified_user();
    user.phone_number = Some("+14155552671".to_string());
    fixture.users.insert(user.clone());

    fixture
        .service
        .start_phone_verification(user.id)
        .await
        .unwrap();
    let code = fixture.dispatcher.last_code().unwrap();

    fixture
        .service
        .finish_phone_verification(
            user.id,
            PhoneOtpRequest { otp: code.clone() },
        )
        .await
        .unwrap();

    let stored = fixture.users.users.lock().unwrap()[0].clone();
    assert!(stored.is_phone_verified);

    // The cached entry was consumed
    let error = fixture
        .service
        .finish_phone_verification(user.id, PhoneOtpRequest { otp: code })
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Otp(OtpError::SessionExpired));
}

#[tokio::test]
async fn test_phone_verification_requires_a_phone_number() {
    let fixture = fixture();
    let user = verified_user();
    fixture.users.insert(user.clone());

    let error = fixture
        .service
        .start_phone_verification(user.id)
        .await
        .unwrap_err();
    assert!(matches!(error, DomainError::Validation { .. }));
}

#[tokio::test]
async fn test_phone_verification_start_is_throttled() {
    let fixture = fixture();
    let mut user = verified_user();
    user.phone_number = Some("+14155552671".to_string());
    fixture.users.insert(user.clone());

    fixture
        .service
        .start_phone_verification(user.id)
        .await
        .unwrap();
    let error = fixture
        .service
        .start_phone_verification(user.id)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        DomainError::Auth(AuthError::Throttled { .. })
    ));
}

#[tokio::test]
async fn test_phone_verification_for_unknown_user() {
    let fixture = fixture();
    let error = fixture
        .service
        .start_phone_verification(Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(error, DomainError::Auth(AuthError::InvalidCredentials));
}
