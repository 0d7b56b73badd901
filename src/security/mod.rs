//! Security module for watchgate.
//!
//! - **Fingerprint**: HMAC-SHA256 keyed, one-way hashing of viewer addresses

pub mod fingerprint;

pub use fingerprint::{Fingerprint, FingerprintHasher};
