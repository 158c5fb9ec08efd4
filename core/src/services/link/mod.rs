//! Signed, time-limited link tokens

mod service;

pub use service::{IssuedLink, LinkPurpose, SignedLinkService};
