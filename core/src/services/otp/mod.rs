//! One-time-passcode management

mod manager;
mod types;

pub use manager::OtpManager;
pub use types::OtpDispatch;
