//! Repository for the import provenance ledger.
//!
//! Ledger rows are never deleted; every lifecycle change is a guarded
//! status transition executed in a single `UPDATE`, so two concurrent
//! requests cannot both win the same transition.

use dealflow_core::batch::BatchStatus;
use dealflow_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::import_batch::{CreateImportBatch, ImportBatch};

/// Column list for `import_batches` joined with its status name.
const BATCH_COLUMNS: &str = "b.id, b.owner_user_id, s.name AS status, b.source_file_name, \
     b.record_count, b.metadata, b.created_at, b.updated_at";

/// Provides lifecycle operations for import batches.
pub struct ImportBatchRepo;

impl ImportBatchRepo {
    /// Open a new ledger entry in `processing` status.
    ///
    /// This must happen before any lead row is written for the batch.
    pub async fn open(pool: &PgPool, input: &CreateImportBatch) -> Result<ImportBatch, sqlx::Error> {
        let sql = format!(
            "WITH inserted AS ( \
                INSERT INTO import_batches (owner_user_id, status_id, source_file_name, record_count) \
                VALUES ( \
                    $1, \
                    (SELECT id FROM import_batch_statuses WHERE name = 'processing'), \
                    $2, $3 \
                ) \
                RETURNING * \
             ) \
             SELECT {cols} FROM inserted b \
             JOIN import_batch_statuses s ON s.id = b.status_id",
            cols = BATCH_COLUMNS
        );
        sqlx::query_as::<_, ImportBatch>(&sql)
            .bind(input.owner_user_id)
            .bind(&input.source_file_name)
            .bind(input.record_count)
            .fetch_one(pool)
            .await
    }

    /// Find a ledger entry by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ImportBatch>, sqlx::Error> {
        let sql = format!(
            "SELECT {BATCH_COLUMNS} FROM import_batches b \
             JOIN import_batch_statuses s ON s.id = b.status_id \
             WHERE b.id = $1"
        );
        sqlx::query_as::<_, ImportBatch>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all ledger entries for an owner, newest first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_user_id: DbId,
    ) -> Result<Vec<ImportBatch>, sqlx::Error> {
        let sql = format!(
            "SELECT {BATCH_COLUMNS} FROM import_batches b \
             JOIN import_batch_statuses s ON s.id = b.status_id \
             WHERE b.owner_user_id = $1 \
             ORDER BY b.created_at DESC, b.id DESC"
        );
        sqlx::query_as::<_, ImportBatch>(&sql)
            .bind(owner_user_id)
            .fetch_all(pool)
            .await
    }

    /// Transition a `processing` batch to a terminal outcome
    /// (`completed` or `failed`), merging `detail` into its metadata.
    ///
    /// Returns `false` when the batch was not in `processing`, i.e. the
    /// transition would be invalid. No row is modified in that case.
    pub async fn close(
        pool: &PgPool,
        id: DbId,
        outcome: BatchStatus,
        detail: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        debug_assert!(BatchStatus::Processing.can_transition_to(outcome));
        let result = sqlx::query(
            "UPDATE import_batches SET \
                status_id = (SELECT id FROM import_batch_statuses WHERE name = $2), \
                metadata = metadata || $3::jsonb, \
                updated_at = now() \
             WHERE id = $1 \
               AND status_id = (SELECT id FROM import_batch_statuses WHERE name = 'processing')",
        )
        .bind(id)
        .bind(outcome.as_str())
        .bind(detail)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition a `completed` batch to `reverted`, recording the actor.
    ///
    /// Returns `false` when the batch was not in `completed` (already
    /// reverted, still processing, or failed). This is the last step of a
    /// revert: a crash beforehand leaves the batch `completed` and the
    /// revert safely retryable.
    pub async fn mark_reverted(pool: &PgPool, id: DbId, actor: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE import_batches SET \
                status_id = (SELECT id FROM import_batch_statuses WHERE name = 'reverted'), \
                metadata = metadata || jsonb_build_object('reverted_by', $2, 'reverted_at', now()), \
                updated_at = now() \
             WHERE id = $1 \
               AND status_id = (SELECT id FROM import_batch_statuses WHERE name = 'completed')",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fail every `processing` batch for an owner created before `cutoff`.
    ///
    /// Batches stuck in `processing` were orphaned by a crash or client
    /// disconnect; read paths call this before listing so the ledger never
    /// reports a stale batch as in flight. Returns the number of rows
    /// transitioned.
    pub async fn fail_stale(
        pool: &PgPool,
        owner_user_id: DbId,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE import_batches SET \
                status_id = (SELECT id FROM import_batch_statuses WHERE name = 'failed'), \
                metadata = metadata || jsonb_build_object('error', 'import abandoned in processing state'), \
                updated_at = now() \
             WHERE owner_user_id = $1 \
               AND status_id = (SELECT id FROM import_batch_statuses WHERE name = 'processing') \
               AND created_at < $2",
        )
        .bind(owner_user_id)
        .bind(cutoff)
        .execute(pool)
        .await?;
        let flipped = result.rows_affected();
        if flipped > 0 {
            tracing::debug!(owner_user_id, flipped, "Failed stale processing batches");
        }
        Ok(flipped)
    }
}
