//! Caller-facing playback descriptors.

use super::model::{Channel, StreamSource};
use serde::{Deserialize, Serialize};

/// Base URL for Mux-hosted HLS playback.
pub const MUX_STREAM_BASE: &str = "https://stream.mux.com";

/// Which player the client should mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    Hls,
    Embed,
}

/// How to play a resolved channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackDescriptor {
    pub player_type: PlayerType,
    pub stream_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub org_short_name: String,
    pub team_slug: String,
}

impl PlaybackDescriptor {
    /// Build the descriptor for a channel's configured stream.
    pub fn for_channel(channel: &Channel) -> Self {
        let (player_type, stream_url, provider) = match &channel.stream {
            StreamSource::ByoHls { manifest_url } => (PlayerType::Hls, manifest_url.clone(), None),
            StreamSource::MuxPlayback { playback_id } => (
                PlayerType::Hls,
                format!("{}/{}.m3u8", MUX_STREAM_BASE, playback_id),
                None,
            ),
            StreamSource::ExternalEmbed {
                embed_url,
                provider,
            } => (PlayerType::Embed, embed_url.clone(), Some(provider.clone())),
        };

        Self {
            player_type,
            stream_url,
            provider,
            org_short_name: channel.org_short_name.clone(),
            team_slug: channel.team_slug.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(stream: StreamSource) -> Channel {
        Channel {
            id: 1,
            org_short_name: "TCHSKISD".into(),
            team_slug: "SoccerJV2".into(),
            require_event_code: false,
            stream,
        }
    }

    #[test]
    fn byo_hls_passes_manifest_through() {
        let d = PlaybackDescriptor::for_channel(&channel(StreamSource::ByoHls {
            manifest_url: "https://stream.mux.com/abc.m3u8".into(),
        }));
        assert_eq!(d.player_type, PlayerType::Hls);
        assert_eq!(d.stream_url, "https://stream.mux.com/abc.m3u8");
        assert_eq!(d.provider, None);
        assert_eq!(d.org_short_name, "TCHSKISD");
        assert_eq!(d.team_slug, "SoccerJV2");
    }

    #[test]
    fn mux_playback_builds_stream_url() {
        let d = PlaybackDescriptor::for_channel(&channel(StreamSource::MuxPlayback {
            playback_id: "Xy12ab".into(),
        }));
        assert_eq!(d.player_type, PlayerType::Hls);
        assert_eq!(d.stream_url, "https://stream.mux.com/Xy12ab.m3u8");
    }

    #[test]
    fn external_embed_carries_provider() {
        let d = PlaybackDescriptor::for_channel(&channel(StreamSource::ExternalEmbed {
            embed_url: "https://www.youtube.com/embed/live123".into(),
            provider: "youtube".into(),
        }));
        assert_eq!(d.player_type, PlayerType::Embed);
        assert_eq!(d.stream_url, "https://www.youtube.com/embed/live123");
        assert_eq!(d.provider.as_deref(), Some("youtube"));
    }

    #[test]
    fn serializes_camel_case() {
        let d = PlaybackDescriptor::for_channel(&channel(StreamSource::ByoHls {
            manifest_url: "https://cdn.example/live.m3u8".into(),
        }));
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["playerType"], "hls");
        assert_eq!(json["streamUrl"], "https://cdn.example/live.m3u8");
        assert_eq!(json["orgShortName"], "TCHSKISD");
        assert_eq!(json["teamSlug"], "SoccerJV2");
        assert!(json.get("provider").is_none());
    }
}
