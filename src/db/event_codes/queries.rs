//! Event code repository for database queries.

use super::models::EventCodeRecord;
use crate::db::DbError;
use crate::security::fingerprint::Fingerprint;
use crate::watch::CodeStatus;
use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::SqlitePool;

type EventCodeRow = (i64, i64, String, String, Option<String>, Option<i64>, i64);

const EVENT_CODE_COLUMNS: &str = "id, channel_id, code, status, bound_ip_hash, bound_at, created_at";

/// Number of attempts [`EventCodeRepository::issue`] makes before giving up on collisions.
const ISSUE_ATTEMPTS: usize = 8;

fn from_row(row: EventCodeRow) -> EventCodeRecord {
    let (id, channel_id, code, status, bound_ip_hash, bound_at, created_at) = row;
    EventCodeRecord {
        id,
        channel_id,
        code,
        status,
        bound_ip_hash,
        bound_at,
        created_at,
    }
}

/// Random 7-digit numeric code, no leading zero.
fn generate_code() -> String {
    rand::thread_rng().gen_range(1_000_000..10_000_000u32).to_string()
}

/// Repository for event code operations.
pub struct EventCodeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EventCodeRepository<'a> {
    /// Create a new event code repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an active, unbound code with the given value.
    pub async fn create(&self, channel_id: i64, code: &str) -> Result<EventCodeRecord, DbError> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO event_codes (channel_id, code, status, created_at)
            VALUES (?, ?, 'active', ?)
            "#,
        )
        .bind(channel_id)
        .bind(code)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return DbError::EventCodeExists(channel_id);
                }
                if db_err.is_foreign_key_violation() {
                    return DbError::ChannelNotFound(channel_id);
                }
            }
            DbError::from(e)
        })?;

        Ok(EventCodeRecord {
            id: result.last_insert_rowid(),
            channel_id,
            code: code.to_string(),
            status: CodeStatus::Active.as_str().to_string(),
            bound_ip_hash: None,
            bound_at: None,
            created_at: now,
        })
    }

    /// Create an active code with a freshly generated 7-digit value.
    pub async fn issue(&self, channel_id: i64) -> Result<EventCodeRecord, DbError> {
        for _ in 0..ISSUE_ATTEMPTS {
            match self.create(channel_id, &generate_code()).await {
                Err(DbError::EventCodeExists(_)) => continue,
                other => return other,
            }
        }
        Err(DbError::Internal(format!(
            "could not generate a unique event code for channel {} after {} attempts",
            channel_id, ISSUE_ATTEMPTS
        )))
    }

    /// Find a code by owning channel and exact value.
    pub async fn find_by_channel_and_code(
        &self,
        channel_id: i64,
        code: &str,
    ) -> Result<Option<EventCodeRecord>, DbError> {
        let sql = format!(
            "SELECT {} FROM event_codes WHERE channel_id = ? AND code = ?",
            EVENT_CODE_COLUMNS
        );
        let row = sqlx::query_as::<_, EventCodeRow>(&sql)
            .bind(channel_id)
            .bind(code)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(from_row))
    }

    /// Find a code by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<EventCodeRecord>, DbError> {
        let sql = format!("SELECT {} FROM event_codes WHERE id = ?", EVENT_CODE_COLUMNS);
        let row = sqlx::query_as::<_, EventCodeRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(from_row))
    }

    /// Revoke or expire a code (or reactivate it). Does not touch the binding.
    pub async fn set_status(&self, id: i64, status: CodeStatus) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE event_codes SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::EventCodeNotFound(id));
        }
        Ok(())
    }

    /// Bind an active, unbound code to a fingerprint.
    ///
    /// Single conditional UPDATE: returns `true` only for the caller whose
    /// write landed. Returns `false` if the code was already bound (or is no
    /// longer active); the caller must re-read to see the winning binding.
    pub async fn bind_if_unbound(
        &self,
        id: i64,
        fingerprint: &Fingerprint,
        bound_at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE event_codes
            SET bound_ip_hash = ?, bound_at = ?
            WHERE id = ? AND bound_ip_hash IS NULL AND status = 'active'
            "#,
        )
        .bind(fingerprint.as_str())
        .bind(bound_at.timestamp())
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
