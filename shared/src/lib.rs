//! # Verigate Shared
//!
//! Cross-cutting types shared by the Verigate workspace: configuration
//! structs, response envelopes, and validation/masking utilities.

pub mod config;
pub mod types;
pub mod utils;
