//! Channel database models.

use crate::db::DbError;
use crate::watch::{Channel, StreamSource, StreamType};

/// A channel row as stored.
///
/// Stream columns are nullable; which one must be present depends on
/// `stream_type`. Use [`ChannelRecord::into_channel`] to get the typed form.
#[derive(Debug, Clone)]
pub struct ChannelRecord {
    pub id: i64,
    pub org_short_name: String,
    pub team_slug: String,
    pub require_event_code: bool,
    pub stream_type: String,
    pub hls_manifest_url: Option<String>,
    pub mux_playback_id: Option<String>,
    pub external_embed_url: Option<String>,
    pub external_provider: Option<String>,
    pub created_at: i64,
}

impl ChannelRecord {
    /// Convert to a [`Channel`], checking that the stream columns match the stream type.
    pub fn into_channel(self) -> Result<Channel, DbError> {
        let invalid = |what: &str| {
            DbError::InvalidRecord(format!(
                "channel {} ({}/{}): {}",
                self.id, self.org_short_name, self.team_slug, what
            ))
        };

        let stream_type = self
            .stream_type
            .parse::<StreamType>()
            .map_err(|e| invalid(&e.to_string()))?;

        let stream = match stream_type {
            StreamType::ByoHls => StreamSource::ByoHls {
                manifest_url: non_empty(self.hls_manifest_url.clone())
                    .ok_or_else(|| invalid("byo_hls without hls_manifest_url"))?,
            },
            StreamType::MuxPlayback => StreamSource::MuxPlayback {
                playback_id: non_empty(self.mux_playback_id.clone())
                    .ok_or_else(|| invalid("mux_playback without mux_playback_id"))?,
            },
            StreamType::ExternalEmbed => StreamSource::ExternalEmbed {
                embed_url: non_empty(self.external_embed_url.clone())
                    .ok_or_else(|| invalid("external_embed without external_embed_url"))?,
                provider: non_empty(self.external_provider.clone())
                    .ok_or_else(|| invalid("external_embed without external_provider"))?,
            },
        };

        Ok(Channel {
            id: self.id,
            org_short_name: self.org_short_name,
            team_slug: self.team_slug,
            require_event_code: self.require_event_code,
            stream,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Input for creating a channel.
#[derive(Debug, Clone)]
pub struct NewChannel {
    pub org_short_name: String,
    pub team_slug: String,
    pub require_event_code: bool,
    pub stream: StreamSource,
}

impl NewChannel {
    pub fn new(org_short_name: &str, team_slug: &str, stream: StreamSource) -> Self {
        Self {
            org_short_name: org_short_name.to_string(),
            team_slug: team_slug.to_string(),
            require_event_code: false,
            stream,
        }
    }

    pub fn byo_hls(org_short_name: &str, team_slug: &str, manifest_url: &str) -> Self {
        Self::new(
            org_short_name,
            team_slug,
            StreamSource::ByoHls {
                manifest_url: manifest_url.to_string(),
            },
        )
    }

    pub fn mux_playback(org_short_name: &str, team_slug: &str, playback_id: &str) -> Self {
        Self::new(
            org_short_name,
            team_slug,
            StreamSource::MuxPlayback {
                playback_id: playback_id.to_string(),
            },
        )
    }

    pub fn external_embed(org_short_name: &str, team_slug: &str, embed_url: &str, provider: &str) -> Self {
        Self::new(
            org_short_name,
            team_slug,
            StreamSource::ExternalEmbed {
                embed_url: embed_url.to_string(),
                provider: provider.to_string(),
            },
        )
    }

    /// Require viewers to present an event code.
    pub fn requiring_event_code(mut self) -> Self {
        self.require_event_code = true;
        self
    }
}
