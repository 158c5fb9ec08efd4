//! User repository interface and mock implementation

pub mod mock;
mod r#trait;

pub use mock::MockUserRepository;
pub use r#trait::{FlagUpdate, UserRepository};
