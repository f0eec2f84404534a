use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, Transaction};
use tracking_model::{SmsDocumentPayload, SmsDocumentState};
use uuid::Uuid;

use crate::error::StoreError;
use crate::unit_of_work::Repository;

/// CRUD operations against sms_documents, scoped to one session.
pub struct DocumentRepository {
    session: Transaction<'static, Sqlite>,
}

impl Repository for DocumentRepository {
    fn bind(session: Transaction<'static, Sqlite>) -> Self {
        Self { session }
    }

    fn release(self) -> Transaction<'static, Sqlite> {
        self.session
    }
}

impl DocumentRepository {
    /// Bulk-upsert every document of a batch in one multi-row statement.
    ///
    /// A batch can hold thousands of documents; a single statement keeps
    /// it to one round trip and makes it atomic, so an unknown transfer
    /// UBID fails the whole collection as an integrity violation with no
    /// partial insert. On conflict of (UBID, uniqueId) the row is a
    /// re-submission: state goes back to INIT and "when" to now.
    ///
    /// Returns the total affected-row count across the batch.
    pub async fn create(&mut self, payload: &SmsDocumentPayload) -> Result<u64, StoreError> {
        if payload.documents.is_empty() {
            return Ok(0);
        }

        let ubid = payload.ubid.to_string();
        let now = Utc::now();
        let mut rows = Vec::with_capacity(payload.documents.len());
        for item in &payload.documents {
            let data = serde_json::to_string(&item.data)?;
            rows.push((item.unique_id.clone(), item.sms_count, data));
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            r#"INSERT INTO sms_documents (UBID, uniqueId, SMScount, data, state, "when") "#,
        );
        query.push_values(rows, |mut binder, (unique_id, sms_count, data)| {
            binder
                .push_bind(ubid.clone())
                .push_bind(unique_id)
                .push_bind(sms_count)
                .push_bind(data)
                .push_bind(SmsDocumentState::Init.as_str())
                .push_bind(now);
        });
        query.push(
            r#" ON CONFLICT(UBID, uniqueId) DO UPDATE SET state = excluded.state, "when" = excluded."when""#,
        );

        let result = query.build().execute(&mut *self.session).await?;
        Ok(result.rows_affected())
    }

    /// Number of document rows under a batch. 0 means "no documents";
    /// whether the batch itself exists is the caller's question to answer
    /// via the transfer table.
    pub async fn count(&mut self, ubid: Uuid) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(uniqueId) FROM sms_documents WHERE UBID = ?",
        )
        .bind(ubid.to_string())
        .fetch_one(&mut *self.session)
        .await?;
        Ok(count)
    }

    /// Update the state of every document under a batch in one statement.
    /// Returns the affected-row count; 0 means the batch had no documents.
    pub async fn update_state(
        &mut self,
        ubid: Uuid,
        state: SmsDocumentState,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(r#"UPDATE sms_documents SET state = ?, "when" = ? WHERE UBID = ?"#)
            .bind(state.as_str())
            .bind(Utc::now())
            .bind(ubid.to_string())
            .execute(&mut *self.session)
            .await?;
        Ok(result.rows_affected())
    }
}
