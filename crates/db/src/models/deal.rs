//! Deal models.

use dealflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `deals` table.
///
/// At most one deal exists per `(owner_user_id, prospect_id)`, enforced by
/// the `uq_deals_owner_prospect` constraint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Deal {
    pub id: DbId,
    pub owner_user_id: DbId,
    /// Copied from the originating lead; the dedup key for deals.
    pub prospect_id: String,
    pub name: String,
    pub value: f64,
    pub stage: String,
    pub deal_type: String,
    pub contact_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a deal from a converted lead.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeal {
    pub owner_user_id: DbId,
    pub prospect_id: String,
    pub name: String,
    pub value: f64,
    pub stage: String,
    pub deal_type: String,
    pub contact_name: Option<String>,
}
