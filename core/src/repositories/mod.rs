//! Repository interfaces for external collaborators

pub mod token;
pub mod user;

pub use token::{MockTokenLedger, RefreshTokenLedger};
pub use user::{FlagUpdate, MockUserRepository, UserRepository};
