//! Repository for leads.

use dealflow_core::lead::LeadStatus;
use dealflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::lead::{Lead, UpsertLead};

/// Column list for `leads`.
const LEAD_COLUMNS: &str = "id, owner_user_id, prospect_id, business_name, contact_name, \
     contact_email, phone, status, deal_value, bf_interest, ct_interest, ba_interest, \
     import_batch_id, created_at, updated_at";

/// Provides merge and query operations for leads.
pub struct LeadRepo;

impl LeadRepo {
    /// Merge a batch of normalized records into the lead store, tagging
    /// each row with `batch_id`.
    ///
    /// Every record is a single idempotent upsert keyed on
    /// `(owner_user_id, prospect_id)`: existing rows have their mutable
    /// fields overwritten and their `import_batch_id` repointed; absent
    /// rows are inserted. The pipeline `status` of an existing lead is
    /// preserved so a re-import cannot reset conversion progress.
    ///
    /// All rows commit in one transaction: a failure rolls back the whole
    /// batch so no lead is ever attributed to a batch the ledger will
    /// record as `failed`.
    pub async fn upsert_batch(
        pool: &PgPool,
        batch_id: DbId,
        records: &[UpsertLead],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut written = 0u64;

        for record in records {
            let result = sqlx::query(
                "INSERT INTO leads \
                    (owner_user_id, prospect_id, business_name, contact_name, contact_email, \
                     phone, deal_value, bf_interest, ct_interest, ba_interest, import_batch_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
                 ON CONFLICT (owner_user_id, prospect_id) DO UPDATE SET \
                    business_name = EXCLUDED.business_name, \
                    contact_name = EXCLUDED.contact_name, \
                    contact_email = EXCLUDED.contact_email, \
                    phone = EXCLUDED.phone, \
                    deal_value = EXCLUDED.deal_value, \
                    bf_interest = EXCLUDED.bf_interest, \
                    ct_interest = EXCLUDED.ct_interest, \
                    ba_interest = EXCLUDED.ba_interest, \
                    import_batch_id = EXCLUDED.import_batch_id, \
                    updated_at = now()",
            )
            .bind(record.owner_user_id)
            .bind(&record.prospect_id)
            .bind(&record.business_name)
            .bind(&record.contact_name)
            .bind(&record.contact_email)
            .bind(&record.phone)
            .bind(record.deal_value)
            .bind(record.bf_interest)
            .bind(record.ct_interest)
            .bind(record.ba_interest)
            .bind(batch_id)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        tracing::debug!(batch_id, rows = written, "Merged lead batch");
        Ok(written)
    }

    /// Find a lead by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lead>, sqlx::Error> {
        let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1");
        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a lead's pipeline status.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: LeadStatus,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let sql = format!(
            "UPDATE leads SET status = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {LEAD_COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// List an owner's leads with the given status, oldest first.
    pub async fn list_by_status(
        pool: &PgPool,
        owner_user_id: DbId,
        status: LeadStatus,
    ) -> Result<Vec<Lead>, sqlx::Error> {
        let sql = format!(
            "SELECT {LEAD_COLUMNS} FROM leads \
             WHERE owner_user_id = $1 AND status = $2 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Lead>(&sql)
            .bind(owner_user_id)
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    /// Delete every lead attributed to the given batch. Returns the number
    /// of rows removed. Re-running after a completed revert deletes zero
    /// rows, which is harmless.
    pub async fn delete_by_batch(pool: &PgPool, batch_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leads WHERE import_batch_id = $1")
            .bind(batch_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count an owner's leads. Used by integration tests and diagnostics.
    pub async fn count_for_owner(pool: &PgPool, owner_user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads WHERE owner_user_id = $1")
            .bind(owner_user_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
