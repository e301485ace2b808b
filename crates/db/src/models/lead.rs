//! Lead models: the system-of-record row and the import upsert DTO.

use dealflow_core::lead_import::LeadRecord;
use dealflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `leads` table.
///
/// `(owner_user_id, prospect_id)` is the natural key: imports merge on it
/// and deal de-duplication keys on it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: DbId,
    pub owner_user_id: DbId,
    pub prospect_id: String,
    pub business_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub deal_value: Option<f64>,
    pub bf_interest: bool,
    pub ct_interest: bool,
    pub ba_interest: bool,
    /// Back-reference to the batch that created or last updated this row.
    pub import_batch_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting one lead during an import.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertLead {
    pub owner_user_id: DbId,
    pub prospect_id: String,
    pub business_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub deal_value: Option<f64>,
    pub bf_interest: bool,
    pub ct_interest: bool,
    pub ba_interest: bool,
}

impl UpsertLead {
    /// Build an upsert DTO from a normalized record, scoped to its owner.
    pub fn from_record(owner_user_id: DbId, record: &LeadRecord) -> Self {
        Self {
            owner_user_id,
            prospect_id: record.prospect_id.clone(),
            business_name: record.business_name.clone(),
            contact_name: record.contact_name.clone(),
            contact_email: record.contact_email.clone(),
            phone: record.phone.clone(),
            deal_value: record.deal_value,
            bf_interest: record.bf_interest,
            ct_interest: record.ct_interest,
            ba_interest: record.ba_interest,
        }
    }
}
