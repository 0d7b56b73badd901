//! In-memory directory and event code store for tests.

use super::model::{Binding, Channel, CodeStatus, EventCode, StreamSource};
use super::store::{BindOutcome, ChannelDirectory, EventCodeStore};
use crate::error::StoreError;
use crate::security::fingerprint::Fingerprint;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct MemoryStore {
    channels: Mutex<Vec<Channel>>,
    codes: Mutex<Vec<EventCode>>,
    /// Every call fails with this error while set.
    failure: Mutex<Option<StoreError>>,
    /// Every call sleeps this long first while set.
    delay: Mutex<Option<Duration>>,
    /// Next bind loses a race to this fingerprint.
    preempt: Mutex<Option<Fingerprint>>,
    bind_calls: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_channel(&self, org: &str, team: &str, require_event_code: bool, stream: StreamSource) -> i64 {
        let mut channels = self.channels.lock();
        let id = channels.len() as i64 + 1;
        channels.push(Channel {
            id,
            org_short_name: org.to_string(),
            team_slug: team.to_string(),
            require_event_code,
            stream,
        });
        id
    }

    pub fn add_code(&self, channel_id: i64, code: &str, status: CodeStatus) -> i64 {
        let mut codes = self.codes.lock();
        let id = codes.len() as i64 + 1;
        codes.push(EventCode {
            id,
            channel_id,
            code: code.to_string(),
            status,
            binding: None,
        });
        id
    }

    pub fn code(&self, id: i64) -> Option<EventCode> {
        self.codes.lock().iter().find(|c| c.id == id).cloned()
    }

    pub fn bind_calls(&self) -> usize {
        *self.bind_calls.lock()
    }

    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock() = Some(err);
    }

    pub fn delay_by(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn preempt_next_bind(&self, winner: Fingerprint) {
        *self.preempt.lock() = Some(winner);
    }

    async fn enter(&self) -> Result<(), StoreError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChannelDirectory for MemoryStore {
    async fn find_channel(
        &self,
        org_short_name: &str,
        team_slug: &str,
    ) -> Result<Option<Channel>, StoreError> {
        self.enter().await?;
        Ok(self
            .channels
            .lock()
            .iter()
            .find(|c| c.org_short_name == org_short_name && c.team_slug == team_slug)
            .cloned())
    }
}

#[async_trait]
impl EventCodeStore for MemoryStore {
    async fn find_by_channel_and_code(
        &self,
        channel_id: i64,
        code: &str,
    ) -> Result<Option<EventCode>, StoreError> {
        self.enter().await?;
        Ok(self
            .codes
            .lock()
            .iter()
            .find(|c| c.channel_id == channel_id && c.code == code)
            .cloned())
    }

    async fn bind_to_fingerprint(
        &self,
        event_code_id: i64,
        fingerprint: &Fingerprint,
        bound_at: DateTime<Utc>,
    ) -> Result<BindOutcome, StoreError> {
        self.enter().await?;
        *self.bind_calls.lock() += 1;

        let mut codes = self.codes.lock();
        let code = codes
            .iter_mut()
            .find(|c| c.id == event_code_id)
            .ok_or_else(|| StoreError::InvalidRecord(format!("no event code {}", event_code_id)))?;

        if let Some(winner) = self.preempt.lock().take()
            && code.binding.is_none()
        {
            code.binding = Some(Binding {
                fingerprint: winner,
                bound_at,
            });
        }

        if code.binding.is_some() || code.status != CodeStatus::Active {
            return Ok(BindOutcome::AlreadyBound);
        }
        code.binding = Some(Binding {
            fingerprint: fingerprint.clone(),
            bound_at,
        });
        Ok(BindOutcome::Bound)
    }
}
