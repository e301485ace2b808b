//! Integration tests for the idempotent lead upsert writer.
//!
//! Exercises the merge semantics against a real database:
//! - Re-importing the same records never duplicates rows
//! - Mutable fields are overwritten; pipeline status is preserved
//! - Batch deletion removes exactly the rows tagged with the batch

use sqlx::PgPool;

use dealflow_core::lead::LeadStatus;
use dealflow_db::models::import_batch::CreateImportBatch;
use dealflow_db::models::lead::UpsertLead;
use dealflow_db::repositories::{ImportBatchRepo, LeadRepo};

const OWNER: i64 = 101;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record(owner: i64, prospect_id: &str, business_name: &str) -> UpsertLead {
    UpsertLead {
        owner_user_id: owner,
        prospect_id: prospect_id.to_string(),
        business_name: business_name.to_string(),
        contact_name: Some("Jo Smith".to_string()),
        contact_email: None,
        phone: None,
        deal_value: Some(1200.0),
        bf_interest: true,
        ct_interest: false,
        ba_interest: false,
    }
}

async fn open_batch(pool: &PgPool, owner: i64, count: i32) -> i64 {
    ImportBatchRepo::open(
        pool,
        &CreateImportBatch {
            owner_user_id: owner,
            source_file_name: "leads.csv".to_string(),
            record_count: count,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Idempotent re-import
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reimport_does_not_duplicate_rows(pool: PgPool) {
    let records = vec![record(OWNER, "P-1", "Acme"), record(OWNER, "P-2", "Globex")];

    let batch1 = open_batch(&pool, OWNER, 2).await;
    LeadRepo::upsert_batch(&pool, batch1, &records).await.unwrap();
    assert_eq!(LeadRepo::count_for_owner(&pool, OWNER).await.unwrap(), 2);

    let batch2 = open_batch(&pool, OWNER, 2).await;
    LeadRepo::upsert_batch(&pool, batch2, &records).await.unwrap();

    // Same final lead set, only the batch attribution moved.
    assert_eq!(LeadRepo::count_for_owner(&pool, OWNER).await.unwrap(), 2);
    let leads = LeadRepo::list_by_status(&pool, OWNER, LeadStatus::New)
        .await
        .unwrap();
    assert!(leads.iter().all(|l| l.import_batch_id == Some(batch2)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upsert_overwrites_fields_but_preserves_status(pool: PgPool) {
    let batch1 = open_batch(&pool, OWNER, 1).await;
    LeadRepo::upsert_batch(&pool, batch1, &[record(OWNER, "P-1", "Acme")])
        .await
        .unwrap();

    let lead = LeadRepo::list_by_status(&pool, OWNER, LeadStatus::New)
        .await
        .unwrap()
        .remove(0);
    LeadRepo::set_status(&pool, lead.id, LeadStatus::Convert)
        .await
        .unwrap();

    // Re-import under a new name.
    let batch2 = open_batch(&pool, OWNER, 1).await;
    let mut updated = record(OWNER, "P-1", "Acme Holdings");
    updated.deal_value = Some(9000.0);
    LeadRepo::upsert_batch(&pool, batch2, &[updated]).await.unwrap();

    let lead = LeadRepo::find_by_id(&pool, lead.id).await.unwrap().unwrap();
    assert_eq!(lead.business_name, "Acme Holdings");
    assert_eq!(lead.deal_value, Some(9000.0));
    assert_eq!(lead.import_batch_id, Some(batch2));
    // Conversion progress survives the re-import.
    assert_eq!(lead.status, "convert");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn same_prospect_id_for_different_owners_stays_separate(pool: PgPool) {
    let other_owner = OWNER + 1;
    let batch1 = open_batch(&pool, OWNER, 1).await;
    LeadRepo::upsert_batch(&pool, batch1, &[record(OWNER, "P-1", "Acme")])
        .await
        .unwrap();
    let batch2 = open_batch(&pool, other_owner, 1).await;
    LeadRepo::upsert_batch(&pool, batch2, &[record(other_owner, "P-1", "Acme")])
        .await
        .unwrap();

    assert_eq!(LeadRepo::count_for_owner(&pool, OWNER).await.unwrap(), 1);
    assert_eq!(
        LeadRepo::count_for_owner(&pool, other_owner).await.unwrap(),
        1
    );
}

// ---------------------------------------------------------------------------
// Batch deletion (revert support)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_by_batch_removes_only_that_batch(pool: PgPool) {
    let batch1 = open_batch(&pool, OWNER, 2).await;
    LeadRepo::upsert_batch(
        &pool,
        batch1,
        &[record(OWNER, "P-1", "Acme"), record(OWNER, "P-2", "Globex")],
    )
    .await
    .unwrap();

    let batch2 = open_batch(&pool, OWNER, 1).await;
    LeadRepo::upsert_batch(&pool, batch2, &[record(OWNER, "P-3", "Initech")])
        .await
        .unwrap();

    let deleted = LeadRepo::delete_by_batch(&pool, batch1).await.unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(LeadRepo::count_for_owner(&pool, OWNER).await.unwrap(), 1);

    // Deleting again is a harmless no-op.
    assert_eq!(LeadRepo::delete_by_batch(&pool, batch1).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_by_batch_spares_rows_reattributed_to_newer_batch(pool: PgPool) {
    let batch1 = open_batch(&pool, OWNER, 1).await;
    LeadRepo::upsert_batch(&pool, batch1, &[record(OWNER, "P-1", "Acme")])
        .await
        .unwrap();

    // The same prospect re-imported later belongs to the new batch.
    let batch2 = open_batch(&pool, OWNER, 1).await;
    LeadRepo::upsert_batch(&pool, batch2, &[record(OWNER, "P-1", "Acme")])
        .await
        .unwrap();

    assert_eq!(LeadRepo::delete_by_batch(&pool, batch1).await.unwrap(), 0);
    assert_eq!(LeadRepo::count_for_owner(&pool, OWNER).await.unwrap(), 1);
}
