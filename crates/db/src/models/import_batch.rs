//! Import batch (provenance ledger) models.

use dealflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `import_batches` ledger, with the status name joined in.
///
/// `metadata` carries free-form lifecycle detail: error text for failed
/// batches, completion counts, and the revert actor/timestamp.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportBatch {
    pub id: DbId,
    pub owner_user_id: DbId,
    pub status: String,
    pub source_file_name: String,
    pub record_count: i32,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for opening a new ledger entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateImportBatch {
    pub owner_user_id: DbId,
    pub source_file_name: String,
    pub record_count: i32,
}
