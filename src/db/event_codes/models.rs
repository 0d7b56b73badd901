//! Event code database models.

use crate::db::DbError;
use crate::security::fingerprint::Fingerprint;
use crate::watch::{Binding, CodeStatus, EventCode};
use chrono::DateTime;

/// An event code row as stored.
#[derive(Debug, Clone)]
pub struct EventCodeRecord {
    pub id: i64,
    pub channel_id: i64,
    pub code: String,
    pub status: String,
    pub bound_ip_hash: Option<String>,
    pub bound_at: Option<i64>,
    pub created_at: i64,
}

impl EventCodeRecord {
    /// Convert to an [`EventCode`], checking the binding columns are set together.
    pub fn into_event_code(self) -> Result<EventCode, DbError> {
        let status = self
            .status
            .parse::<CodeStatus>()
            .map_err(|e| DbError::InvalidRecord(format!("event code {}: {}", self.id, e)))?;

        let binding = match (self.bound_ip_hash, self.bound_at) {
            (None, None) => None,
            (Some(hash), Some(at)) => {
                let bound_at = DateTime::from_timestamp(at, 0).ok_or_else(|| {
                    DbError::InvalidRecord(format!("event code {}: bound_at out of range", self.id))
                })?;
                Some(Binding {
                    fingerprint: Fingerprint::from_stored(hash),
                    bound_at,
                })
            }
            _ => {
                return Err(DbError::InvalidRecord(format!(
                    "event code {}: bound_ip_hash and bound_at must be set together",
                    self.id
                )));
            }
        };

        Ok(EventCode {
            id: self.id,
            channel_id: self.channel_id,
            code: self.code,
            status,
            binding,
        })
    }
}
