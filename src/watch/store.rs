//! Directory and event code store abstractions.
//!
//! The resolver only sees these traits. Production wires them to SQLite
//! ([`super::sqlite`]); tests substitute an in-memory fake.

use super::model::{Channel, EventCode};
use crate::error::StoreError;
use crate::security::fingerprint::Fingerprint;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of a bind attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// This call's fingerprint was written.
    Bound,
    /// The code was already bound (or stopped being active) before this write.
    AlreadyBound,
}

/// Resolves `(org_short_name, team_slug)` to a channel.
#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    /// Exact, case-sensitive lookup. `Ok(None)` when no channel matches.
    async fn find_channel(
        &self,
        org_short_name: &str,
        team_slug: &str,
    ) -> Result<Option<Channel>, StoreError>;
}

/// Per-channel event codes and their bindings.
#[async_trait]
pub trait EventCodeStore: Send + Sync {
    /// Exact match on `code` within the channel.
    async fn find_by_channel_and_code(
        &self,
        channel_id: i64,
        code: &str,
    ) -> Result<Option<EventCode>, StoreError>;

    /// Bind the code to `fingerprint` only if it is currently unbound.
    ///
    /// Concurrent callers for the same code must see exactly one
    /// [`BindOutcome::Bound`]; the rest get [`BindOutcome::AlreadyBound`].
    async fn bind_to_fingerprint(
        &self,
        event_code_id: i64,
        fingerprint: &Fingerprint,
        bound_at: DateTime<Utc>,
    ) -> Result<BindOutcome, StoreError>;
}
