//! Channel and event code domain types.

use crate::security::fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// A publishable destination identified by `(org_short_name, team_slug)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: i64,
    pub org_short_name: String,
    pub team_slug: String,
    pub require_event_code: bool,
    pub stream: StreamSource,
}

/// Where a channel's stream is played from.
///
/// Each variant carries exactly the fields its stream type needs, so a
/// `byo_hls` channel without a manifest URL cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSource {
    /// Broadcaster-supplied HLS manifest.
    ByoHls { manifest_url: String },
    /// Mux-hosted live stream, addressed by playback id.
    MuxPlayback { playback_id: String },
    /// Third-party player embedded by URL.
    ExternalEmbed { embed_url: String, provider: String },
}

impl StreamSource {
    pub fn stream_type(&self) -> StreamType {
        match self {
            Self::ByoHls { .. } => StreamType::ByoHls,
            Self::MuxPlayback { .. } => StreamType::MuxPlayback,
            Self::ExternalEmbed { .. } => StreamType::ExternalEmbed,
        }
    }
}

/// Stored discriminator for [`StreamSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    ByoHls,
    MuxPlayback,
    ExternalEmbed,
}

impl StreamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ByoHls => "byo_hls",
            Self::MuxPlayback => "mux_playback",
            Self::ExternalEmbed => "external_embed",
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "byo_hls" => Ok(Self::ByoHls),
            "mux_playback" => Ok(Self::MuxPlayback),
            "external_embed" => Ok(Self::ExternalEmbed),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Lifecycle status of an event code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStatus {
    Active,
    Revoked,
    Expired,
}

impl CodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "revoked" => Ok(Self::Revoked),
            "expired" => Ok(Self::Expired),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// A stored enum column held a value this build does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// The network fingerprint an event code was bound to, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub fingerprint: Fingerprint,
    pub bound_at: DateTime<Utc>,
}

/// A shared access code for a channel's broadcast.
///
/// `binding` is `None` while the code is unbound. Once set it never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCode {
    pub id: i64,
    pub channel_id: i64,
    pub code: String,
    pub status: CodeStatus,
    pub binding: Option<Binding>,
}

impl EventCode {
    pub fn is_active(&self) -> bool {
        self.status == CodeStatus::Active
    }
}
