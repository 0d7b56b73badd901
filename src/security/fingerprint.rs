//! Viewer fingerprints - privacy-preserving network address comparison.
//!
//! A fingerprint is an HMAC-SHA256 of the canonical textual form of a viewer's
//! IP address, keyed with the deployment's fingerprint secret. Event code
//! bindings store only the fingerprint, never the raw address.
//!
//! # Security Model
//!
//! - Keyed: fingerprints from two deployments with different secrets cannot be
//!   correlated
//! - One-way: the address cannot be recovered without brute-forcing the
//!   address space *and* knowing the secret
//! - Deterministic: same address + secret always yields the same fingerprint
//! - Comparison is constant time
//!
//! Unlike hostname cloaking, no CIDR masking is applied: two hosts in the same
//! /24 must produce distinct fingerprints.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::net::IpAddr;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Opaque keyed hash of a viewer address.
#[derive(Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a fingerprint previously produced by [`hash`] and read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time equality.
    pub fn matches(&self, other: &Fingerprint) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fingerprint").field(&self.0).finish()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash a raw address string with the given secret.
///
/// The input is used verbatim. Callers holding an [`IpAddr`] should go
/// through [`FingerprintHasher::fingerprint`], which canonicalises first.
pub fn hash(raw_address: &str, secret: &str) -> Fingerprint {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(raw_address.as_bytes());
    let digest = mac.finalize().into_bytes();
    Fingerprint(URL_SAFE_NO_PAD.encode(digest))
}

/// Fingerprint hasher bound to a deployment secret.
#[derive(Clone)]
pub struct FingerprintHasher {
    secret: String,
}

impl FingerprintHasher {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Fingerprint a viewer address.
    ///
    /// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) hash the same as the
    /// plain IPv4 address, so dual-stack listeners do not split one viewer
    /// into two fingerprints.
    pub fn fingerprint(&self, ip: IpAddr) -> Fingerprint {
        hash(&ip.to_canonical().to_string(), &self.secret)
    }
}

impl fmt::Debug for FingerprintHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintHasher")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Check if a secret is a placeholder or too short to be trusted.
pub fn is_default_secret(secret: &str) -> bool {
    secret.is_empty()
        || secret == "changeme"
        || secret.contains("default")
        || secret.contains("changeme")
        || secret.len() < 16
}
