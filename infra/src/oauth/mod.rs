//! OAuth provider adapters

mod google;

pub use google::{GoogleOAuthAdapter, GoogleOAuthConfig};
