//! Business services composing the authentication and verification flows

pub mod account;
pub mod auth;
pub mod cache;
pub mod dispatch;
pub mod link;
pub mod otp;
pub mod social;
pub mod throttle;
pub mod token;

pub use account::AccountFlowService;
pub use auth::{validate_password, AuthService, CredentialValidator};
pub use cache::{CacheStore, MemoryCacheStore};
pub use dispatch::{Channel, MessageDispatcher, MockDispatcher};
pub use link::{IssuedLink, LinkPurpose, SignedLinkService};
pub use otp::{OtpDispatch, OtpManager};
pub use social::{MockOAuthAdapter, OAuthAdapter};
pub use throttle::{ThrottleGuard, ThrottleScope};
pub use token::{Rs256KeyManager, TokenService, TokenServiceConfig};
