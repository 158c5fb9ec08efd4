//! Refresh token ledger interface and mock implementation

pub mod mock;
mod r#trait;

pub use mock::MockTokenLedger;
pub use r#trait::RefreshTokenLedger;
