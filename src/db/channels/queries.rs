//! Channel repository for database queries.

use super::models::{ChannelRecord, NewChannel};
use crate::db::DbError;
use crate::watch::StreamSource;
use sqlx::SqlitePool;

type ChannelRow = (
    i64,
    String,
    String,
    bool,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
);

const CHANNEL_COLUMNS: &str = "id, org_short_name, team_slug, require_event_code, stream_type, \
     hls_manifest_url, mux_playback_id, external_embed_url, external_provider, created_at";

fn from_row(row: ChannelRow) -> ChannelRecord {
    let (
        id,
        org_short_name,
        team_slug,
        require_event_code,
        stream_type,
        hls_manifest_url,
        mux_playback_id,
        external_embed_url,
        external_provider,
        created_at,
    ) = row;
    ChannelRecord {
        id,
        org_short_name,
        team_slug,
        require_event_code,
        stream_type,
        hls_manifest_url,
        mux_playback_id,
        external_embed_url,
        external_provider,
        created_at,
    }
}

/// Repository for channel operations.
pub struct ChannelRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChannelRepository<'a> {
    /// Create a new channel repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a channel.
    pub async fn create(&self, new: &NewChannel) -> Result<ChannelRecord, DbError> {
        let now = chrono::Utc::now().timestamp();

        let (hls_manifest_url, mux_playback_id, external_embed_url, external_provider) =
            match &new.stream {
                StreamSource::ByoHls { manifest_url } => (Some(manifest_url.as_str()), None, None, None),
                StreamSource::MuxPlayback { playback_id } => (None, Some(playback_id.as_str()), None, None),
                StreamSource::ExternalEmbed {
                    embed_url,
                    provider,
                } => (None, None, Some(embed_url.as_str()), Some(provider.as_str())),
            };
        let stream_type = new.stream.stream_type().as_str();

        let result = sqlx::query(
            r#"
            INSERT INTO channels (org_short_name, team_slug, require_event_code, stream_type,
                                  hls_manifest_url, mux_playback_id, external_embed_url,
                                  external_provider, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.org_short_name)
        .bind(&new.team_slug)
        .bind(new.require_event_code)
        .bind(stream_type)
        .bind(hls_manifest_url)
        .bind(mux_playback_id)
        .bind(external_embed_url)
        .bind(external_provider)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DbError::ChannelExists(format!("{}/{}", new.org_short_name, new.team_slug));
            }
            DbError::from(e)
        })?;

        Ok(ChannelRecord {
            id: result.last_insert_rowid(),
            org_short_name: new.org_short_name.clone(),
            team_slug: new.team_slug.clone(),
            require_event_code: new.require_event_code,
            stream_type: stream_type.to_string(),
            hls_manifest_url: hls_manifest_url.map(String::from),
            mux_playback_id: mux_playback_id.map(String::from),
            external_embed_url: external_embed_url.map(String::from),
            external_provider: external_provider.map(String::from),
            created_at: now,
        })
    }

    /// Find channel by org short name and team slug.
    ///
    /// Case-sensitive on both parts; callers pass canonical casing.
    pub async fn find_by_org_and_team(
        &self,
        org_short_name: &str,
        team_slug: &str,
    ) -> Result<Option<ChannelRecord>, DbError> {
        let sql = format!(
            "SELECT {} FROM channels WHERE org_short_name = ? AND team_slug = ?",
            CHANNEL_COLUMNS
        );
        let row = sqlx::query_as::<_, ChannelRow>(&sql)
            .bind(org_short_name)
            .bind(team_slug)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(from_row))
    }

    /// Find channel by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ChannelRecord>, DbError> {
        let sql = format!("SELECT {} FROM channels WHERE id = ?", CHANNEL_COLUMNS);
        let row = sqlx::query_as::<_, ChannelRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(from_row))
    }

}
