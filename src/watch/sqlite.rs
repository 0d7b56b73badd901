//! SQLite-backed [`ChannelDirectory`] and [`EventCodeStore`].

use super::model::{Channel, EventCode};
use super::store::{BindOutcome, ChannelDirectory, EventCodeStore};
use crate::db::Database;
use crate::error::StoreError;
use crate::security::fingerprint::Fingerprint;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub struct SqliteDirectory {
    db: Database,
}

impl SqliteDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChannelDirectory for SqliteDirectory {
    async fn find_channel(
        &self,
        org_short_name: &str,
        team_slug: &str,
    ) -> Result<Option<Channel>, StoreError> {
        let record = self
            .db
            .channels()
            .find_by_org_and_team(org_short_name, team_slug)
            .await?;

        match record {
            Some(record) => Ok(Some(record.into_channel()?)),
            None => Ok(None),
        }
    }
}

pub struct SqliteEventCodeStore {
    db: Database,
}

impl SqliteEventCodeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventCodeStore for SqliteEventCodeStore {
    async fn find_by_channel_and_code(
        &self,
        channel_id: i64,
        code: &str,
    ) -> Result<Option<EventCode>, StoreError> {
        let record = self
            .db
            .event_codes()
            .find_by_channel_and_code(channel_id, code)
            .await?;

        match record {
            Some(record) => Ok(Some(record.into_event_code()?)),
            None => Ok(None),
        }
    }

    async fn bind_to_fingerprint(
        &self,
        event_code_id: i64,
        fingerprint: &Fingerprint,
        bound_at: DateTime<Utc>,
    ) -> Result<BindOutcome, StoreError> {
        let bound = self
            .db
            .event_codes()
            .bind_if_unbound(event_code_id, fingerprint, bound_at)
            .await?;

        Ok(if bound {
            BindOutcome::Bound
        } else {
            BindOutcome::AlreadyBound
        })
    }
}
