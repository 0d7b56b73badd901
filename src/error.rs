//! Unified error handling for watchgate.
//!
//! Resolution attempts end in exactly one [`ResolveError`] kind, which the
//! HTTP layer maps to a status code. Backing-store failures surface as
//! [`StoreError`] and are classified by the resolver.

use http::StatusCode;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Resolution Errors (caller-facing)
// ============================================================================

/// Terminal outcome of a failed watch-link resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No channel for the requested org/team.
    #[error("channel not found")]
    NotFound,

    /// Code missing when required, or unknown/inactive.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Valid, active code bound to a different network.
    #[error("event code bound to a different network")]
    Forbidden,

    /// Backing store unavailable or timed out. Safe to retry.
    #[error("temporarily unavailable: {0}")]
    Transient(String),
}

impl ResolveError {
    pub const CODE_REQUIRED: Self = Self::Unauthorized("event code required");
    pub const CODE_INVALID: Self = Self::Unauthorized("invalid event code");

    /// Get a static error code string for metrics labeling and JSON bodies.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Transient(_) => "transient",
        }
    }

    /// HTTP status the API layer should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

// ============================================================================
// Store Errors (directory / event code store)
// ============================================================================

/// Errors from a [`ChannelDirectory`](crate::watch::ChannelDirectory) or
/// [`EventCodeStore`](crate::watch::EventCodeStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// A stored row violates the data model (e.g. stream type without its URL).
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl From<crate::db::DbError> for StoreError {
    fn from(err: crate::db::DbError) -> Self {
        use crate::db::DbError;
        match err {
            DbError::InvalidRecord(msg) => StoreError::InvalidRecord(msg),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}
