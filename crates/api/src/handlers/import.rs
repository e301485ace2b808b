//! Handlers for lead batch import and revert.
//!
//! An import is one short-lived unit of work: normalize the raw CSV, open
//! a provenance ledger entry, merge the rows in a single transaction, and
//! close the entry with a truthful terminal status. A revert deletes the
//! rows attributed to a completed batch and marks the ledger entry last,
//! so a crash mid-revert leaves the batch safely retryable.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use dealflow_core::batch::BatchStatus;
use dealflow_core::error::CoreError;
use dealflow_core::lead_import::{normalize, RowRejection};
use dealflow_core::types::DbId;
use dealflow_db::models::import_batch::{CreateImportBatch, ImportBatch};
use dealflow_db::models::lead::UpsertLead;
use dealflow_db::repositories::{ImportBatchRepo, LeadRepo};
use dealflow_events::{EventKind, PipelineEvent};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ── Import ───────────────────────────────────────────────────────────

/// Request body for the lead import endpoint.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub owner_id: DbId,
    pub file_name: String,
    pub csv_text: String,
}

/// Typed response for the lead import endpoint.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub batch_id: DbId,
    pub imported_count: usize,
    pub rejected_count: usize,
    pub rejections: Vec<RowRejection>,
}

/// POST /api/v1/leads/import
///
/// Normalize the uploaded CSV and merge it into the lead store under a new
/// import batch. Row-level rejections are reported alongside the success
/// summary; only a file with zero valid rows fails outright.
pub async fn import_leads(
    State(state): State<AppState>,
    Json(body): Json<ImportRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ImportResult>>)> {
    // Pure validation first: nothing is written until rows survive it.
    let parsed = normalize(&body.csv_text)
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let batch = ImportBatchRepo::open(
        &state.pool,
        &CreateImportBatch {
            owner_user_id: body.owner_id,
            source_file_name: body.file_name.clone(),
            record_count: parsed.records.len() as i32,
        },
    )
    .await?;

    let rows: Vec<UpsertLead> = parsed
        .records
        .iter()
        .map(|r| UpsertLead::from_record(body.owner_id, r))
        .collect();

    if let Err(e) = LeadRepo::upsert_batch(&state.pool, batch.id, &rows).await {
        // The transaction rolled back; record the truthful terminal state.
        let detail = serde_json::json!({ "error": e.to_string() });
        if let Err(close_err) =
            ImportBatchRepo::close(&state.pool, batch.id, BatchStatus::Failed, &detail).await
        {
            tracing::error!(
                batch_id = batch.id,
                error = %close_err,
                "Failed to mark import batch as failed"
            );
        }
        return Err(AppError::Database(e));
    }

    let detail = serde_json::json!({
        "imported": rows.len(),
        "rejected": parsed.rejections.len(),
        "completed_at": Utc::now(),
    });
    let closed =
        ImportBatchRepo::close(&state.pool, batch.id, BatchStatus::Completed, &detail).await?;
    if !closed {
        // Lost the transition (e.g. the batch was stale-failed concurrently).
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Import batch {} is no longer in processing state",
            batch.id
        ))));
    }

    state.event_bus.publish(PipelineEvent::new(
        EventKind::Import,
        body.owner_id,
        batch.id,
        format!("Imported {} leads from {}", rows.len(), body.file_name),
    ));

    tracing::info!(
        batch_id = batch.id,
        owner_id = body.owner_id,
        imported = rows.len(),
        rejected = parsed.rejections.len(),
        "Lead import completed"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ImportResult {
                batch_id: batch.id,
                imported_count: rows.len(),
                rejected_count: parsed.rejections.len(),
                rejections: parsed.rejections,
            },
        }),
    ))
}

// ── Revert ───────────────────────────────────────────────────────────

/// Request body for the batch revert endpoint.
#[derive(Debug, Deserialize)]
pub struct RevertRequest {
    pub owner_id: DbId,
}

/// Typed response for the batch revert endpoint.
#[derive(Debug, Serialize)]
pub struct RevertResult {
    pub batch_id: DbId,
    pub deleted_count: u64,
}

/// POST /api/v1/imports/{id}/revert
///
/// Delete every lead attributed to a completed batch, then mark the ledger
/// entry `reverted`. Deals created from converted leads are untouched:
/// conversion is a deliberate user action, not part of the import.
pub async fn revert_import(
    State(state): State<AppState>,
    Path(batch_id): Path<DbId>,
    Json(body): Json<RevertRequest>,
) -> AppResult<Json<DataResponse<RevertResult>>> {
    let batch = ImportBatchRepo::find_by_id(&state.pool, batch_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ImportBatch",
            id: batch_id,
        }))?;

    if batch.owner_user_id != body.owner_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Import batch belongs to another user".to_string(),
        )));
    }

    match BatchStatus::from_str(&batch.status) {
        Some(BatchStatus::Completed) => {}
        Some(BatchStatus::Reverted) => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Import batch {batch_id} has already been reverted"
            ))));
        }
        _ => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Only completed batches can be reverted (batch {batch_id} is '{}')",
                batch.status
            ))));
        }
    }

    // Delete first, mark last: a crash in between leaves the batch
    // `completed` and the revert retryable as a no-op delete.
    let deleted_count = LeadRepo::delete_by_batch(&state.pool, batch_id).await?;

    let marked = ImportBatchRepo::mark_reverted(&state.pool, batch_id, body.owner_id).await?;
    if !marked {
        // A concurrent revert won the transition after our status read.
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Import batch {batch_id} has already been reverted"
        ))));
    }

    tracing::info!(
        batch_id,
        owner_id = body.owner_id,
        deleted = deleted_count,
        "Import batch reverted"
    );

    Ok(Json(DataResponse {
        data: RevertResult {
            batch_id,
            deleted_count,
        },
    }))
}

// ── Ledger reads ─────────────────────────────────────────────────────

/// Query parameters identifying the requesting owner.
#[derive(Debug, Deserialize)]
pub struct OwnerParams {
    pub owner_id: DbId,
}

/// GET /api/v1/imports
///
/// List the owner's import batches. Batches abandoned in `processing`
/// are failed first so the ledger never reports them as in flight.
pub async fn list_import_batches(
    State(state): State<AppState>,
    Query(params): Query<OwnerParams>,
) -> AppResult<Json<DataResponse<Vec<ImportBatch>>>> {
    fail_stale_batches(&state, params.owner_id).await?;

    let batches = ImportBatchRepo::list_for_owner(&state.pool, params.owner_id).await?;
    Ok(Json(DataResponse { data: batches }))
}

/// GET /api/v1/imports/{id}
pub async fn get_import_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<DbId>,
    Query(params): Query<OwnerParams>,
) -> AppResult<Json<DataResponse<ImportBatch>>> {
    fail_stale_batches(&state, params.owner_id).await?;

    let batch = ImportBatchRepo::find_by_id(&state.pool, batch_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ImportBatch",
            id: batch_id,
        }))?;

    if batch.owner_user_id != params.owner_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Import batch belongs to another user".to_string(),
        )));
    }

    Ok(Json(DataResponse { data: batch }))
}

/// Lazily fail the owner's stale `processing` batches.
async fn fail_stale_batches(state: &AppState, owner_id: DbId) -> Result<(), sqlx::Error> {
    let cutoff = Utc::now() - Duration::minutes(state.config.stale_batch_mins);
    let flipped = ImportBatchRepo::fail_stale(&state.pool, owner_id, cutoff).await?;
    if flipped > 0 {
        tracing::warn!(owner_id, flipped, "Failed stale processing import batches");
    }
    Ok(())
}
