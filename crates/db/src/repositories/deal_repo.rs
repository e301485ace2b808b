//! Repository for deals.

use dealflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::deal::{CreateDeal, Deal};

/// Column list for `deals`.
const DEAL_COLUMNS: &str = "id, owner_user_id, prospect_id, name, value, stage, deal_type, \
     contact_name, created_at, updated_at";

/// Provides creation and lookup operations for deals.
pub struct DealRepo;

impl DealRepo {
    /// Insert a deal unless one already exists for the prospect.
    ///
    /// The `uq_deals_owner_prospect` constraint is the correctness
    /// mechanism for the at-most-one-deal invariant: `ON CONFLICT DO
    /// NOTHING` makes a lost race return `None` instead of an error, which
    /// callers treat as "invariant already satisfied".
    pub async fn insert_if_absent(
        pool: &PgPool,
        input: &CreateDeal,
    ) -> Result<Option<Deal>, sqlx::Error> {
        let sql = format!(
            "INSERT INTO deals \
                (owner_user_id, prospect_id, name, value, stage, deal_type, contact_name) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT ON CONSTRAINT uq_deals_owner_prospect DO NOTHING \
             RETURNING {DEAL_COLUMNS}"
        );
        sqlx::query_as::<_, Deal>(&sql)
            .bind(input.owner_user_id)
            .bind(&input.prospect_id)
            .bind(&input.name)
            .bind(input.value)
            .bind(&input.stage)
            .bind(&input.deal_type)
            .bind(&input.contact_name)
            .fetch_optional(pool)
            .await
    }

    /// Fast-path existence check for a prospect's deal. Not a correctness
    /// guard; the unique constraint is.
    pub async fn exists_for_prospect(
        pool: &PgPool,
        owner_user_id: DbId,
        prospect_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM deals WHERE owner_user_id = $1 AND prospect_id = $2)",
        )
        .bind(owner_user_id)
        .bind(prospect_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Find a deal by its prospect natural key.
    pub async fn find_by_prospect(
        pool: &PgPool,
        owner_user_id: DbId,
        prospect_id: &str,
    ) -> Result<Option<Deal>, sqlx::Error> {
        let sql = format!(
            "SELECT {DEAL_COLUMNS} FROM deals WHERE owner_user_id = $1 AND prospect_id = $2"
        );
        sqlx::query_as::<_, Deal>(&sql)
            .bind(owner_user_id)
            .bind(prospect_id)
            .fetch_optional(pool)
            .await
    }

    /// Count deals for a prospect. With the unique constraint in place
    /// this is 0 or 1; tests assert on it directly.
    pub async fn count_for_prospect(
        pool: &PgPool,
        owner_user_id: DbId,
        prospect_id: &str,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM deals WHERE owner_user_id = $1 AND prospect_id = $2",
        )
        .bind(owner_user_id)
        .bind(prospect_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
