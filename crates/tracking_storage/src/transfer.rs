use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite, Transaction};
use tracking_model::{SmsTransferPayload, SmsTransferState};
use uuid::Uuid;

use crate::error::StoreError;
use crate::unit_of_work::Repository;

/// One row of sms_transfers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SmsTransferRow {
    #[serde(rename = "UBID")]
    #[sqlx(rename = "UBID")]
    pub ubid: String,
    #[serde(rename = "fileName")]
    #[sqlx(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "origName")]
    #[sqlx(rename = "origName")]
    pub orig_name: String,
    #[serde(rename = "SMScount")]
    #[sqlx(rename = "SMScount")]
    pub sms_count: i64,
    pub documents: i64,
    #[serde(rename = "fallbackCount")]
    #[sqlx(rename = "fallbackCount")]
    pub fallback_count: i64,
    #[sqlx(try_from = "String")]
    pub state: SmsTransferState,
    pub when: DateTime<Utc>,
}

const SELECT_TRANSFER: &str = r#"SELECT UBID, fileName, origName, SMScount, documents, fallbackCount, state, "when" FROM sms_transfers"#;

/// CRUD operations against sms_transfers, scoped to one session.
pub struct TransferRepository {
    session: Transaction<'static, Sqlite>,
}

impl Repository for TransferRepository {
    fn bind(session: Transaction<'static, Sqlite>) -> Self {
        Self { session }
    }

    fn release(self) -> Transaction<'static, Sqlite> {
        self.session
    }
}

impl TransferRepository {
    /// Upsert one transfer row keyed on UBID.
    ///
    /// Retrying a failed batch must be safe: on conflict the tracking
    /// state is reset (fallbackCount 0, state INIT, "when" now) and the
    /// descriptive fields of the existing row are left untouched. The
    /// server-assigned values are written explicitly rather than left to
    /// column defaults.
    pub async fn create(&mut self, payload: &SmsTransferPayload) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"INSERT INTO sms_transfers (UBID, fileName, origName, SMScount, documents, fallbackCount, state, "when")
               VALUES (?, ?, ?, ?, ?, 0, ?, ?)
               ON CONFLICT(UBID) DO UPDATE SET fallbackCount = 0, state = excluded.state, "when" = excluded."when""#,
        )
        .bind(payload.ubid.to_string())
        .bind(&payload.file_name)
        .bind(&payload.orig_name)
        .bind(payload.sms_count)
        .bind(payload.documents)
        .bind(SmsTransferState::Init.as_str())
        .bind(Utc::now())
        .execute(&mut *self.session)
        .await?;
        Ok(result.rows_affected())
    }

    /// Every transfer row, unfiltered; batch cardinality is small.
    pub async fn read_all(&mut self) -> Result<Vec<SmsTransferRow>, StoreError> {
        let rows = sqlx::query_as::<_, SmsTransferRow>(SELECT_TRANSFER)
            .fetch_all(&mut *self.session)
            .await?;
        Ok(rows)
    }

    pub async fn read(&mut self, ubid: Uuid) -> Result<Option<SmsTransferRow>, StoreError> {
        let sql = format!("{SELECT_TRANSFER} WHERE UBID = ?");
        let row = sqlx::query_as::<_, SmsTransferRow>(&sql)
            .bind(ubid.to_string())
            .fetch_optional(&mut *self.session)
            .await?;
        Ok(row)
    }

    /// Update the state column; "when" is refreshed alongside. Returns the
    /// affected-row count, 0 when the UBID is unknown.
    pub async fn update_state(
        &mut self,
        ubid: Uuid,
        state: SmsTransferState,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(r#"UPDATE sms_transfers SET state = ?, "when" = ? WHERE UBID = ?"#)
            .bind(state.as_str())
            .bind(Utc::now())
            .bind(ubid.to_string())
            .execute(&mut *self.session)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete the transfer row; document rows go with it via the cascade.
    pub async fn delete(&mut self, ubid: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sms_transfers WHERE UBID = ?")
            .bind(ubid.to_string())
            .execute(&mut *self.session)
            .await?;
        Ok(result.rows_affected())
    }

    /// Re-read an in-memory row from storage, picking up writes made by a
    /// previous call on the same session (update_state does not return the
    /// updated row).
    pub async fn refresh(&mut self, row: &mut SmsTransferRow) -> Result<(), StoreError> {
        let sql = format!("{SELECT_TRANSFER} WHERE UBID = ?");
        let fresh = sqlx::query_as::<_, SmsTransferRow>(&sql)
            .bind(&row.ubid)
            .fetch_one(&mut *self.session)
            .await?;
        *row = fresh;
        Ok(())
    }
}
