//! Handlers for lead conversion and conversion reconciliation.
//!
//! Both entry points enforce the same invariant: every lead in `convert`
//! status has exactly one deal with a matching prospect id. The
//! application-level existence check is only a fast path; the unique
//! constraint on `(owner_user_id, prospect_id)` is the correctness
//! mechanism, with a lost insert race treated as already satisfied.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use dealflow_core::conversion::{derive_deal_type, INITIAL_DEAL_STAGE};
use dealflow_core::error::CoreError;
use dealflow_core::lead::LeadStatus;
use dealflow_core::types::DbId;
use dealflow_db::models::deal::CreateDeal;
use dealflow_db::models::lead::Lead;
use dealflow_db::repositories::{DealRepo, LeadRepo};
use dealflow_events::{EventKind, PipelineEvent};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body carrying the requesting owner.
#[derive(Debug, Deserialize)]
pub struct OwnerRequest {
    pub owner_id: DbId,
}

// ── Explicit convert ─────────────────────────────────────────────────

/// Typed response for the explicit convert endpoint.
#[derive(Debug, Serialize)]
pub struct ConvertResult {
    pub lead_id: DbId,
    pub deal_created: bool,
}

/// POST /api/v1/leads/{id}/convert
///
/// Mark a lead as converted and ensure it has a deal. Converting an
/// already-converted lead is idempotent: no second deal is created.
pub async fn convert_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<DbId>,
    Json(body): Json<OwnerRequest>,
) -> AppResult<Json<DataResponse<ConvertResult>>> {
    let lead = LeadRepo::find_by_id(&state.pool, lead_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lead",
            id: lead_id,
        }))?;

    if lead.owner_user_id != body.owner_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Lead belongs to another user".to_string(),
        )));
    }

    let lead = LeadRepo::set_status(&state.pool, lead_id, LeadStatus::Convert)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lead",
            id: lead_id,
        }))?;

    // A deal-creation failure on the explicit path is fatal to the request.
    let deal_created = ensure_deal(&state, &lead).await?;

    Ok(Json(DataResponse {
        data: ConvertResult {
            lead_id,
            deal_created,
        },
    }))
}

// ── Reconciliation sweep ─────────────────────────────────────────────

/// Typed response for the reconciliation sweep endpoint.
#[derive(Debug, Serialize)]
pub struct ReconcileResult {
    pub scanned_count: usize,
    pub converted_count: usize,
}

/// POST /api/v1/conversions/reconcile
///
/// Repair drift: scan every `convert`-status lead for the owner and create
/// the missing deals. Leads set to `convert` through side channels (bulk
/// edits) are picked up here. A per-lead failure is logged and skipped; it
/// never aborts the sweep for the remaining leads.
pub async fn reconcile_conversions(
    State(state): State<AppState>,
    Json(body): Json<OwnerRequest>,
) -> AppResult<Json<DataResponse<ReconcileResult>>> {
    let leads = LeadRepo::list_by_status(&state.pool, body.owner_id, LeadStatus::Convert).await?;

    let mut converted_count = 0;
    for lead in &leads {
        match ensure_deal(&state, lead).await {
            Ok(true) => converted_count += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(
                    lead_id = lead.id,
                    prospect_id = %lead.prospect_id,
                    error = %e,
                    "Skipping lead: deal creation failed"
                );
            }
        }
    }

    tracing::info!(
        owner_id = body.owner_id,
        scanned = leads.len(),
        converted = converted_count,
        "Conversion reconciliation sweep finished"
    );

    Ok(Json(DataResponse {
        data: ReconcileResult {
            scanned_count: leads.len(),
            converted_count,
        },
    }))
}

// ── Shared ───────────────────────────────────────────────────────────

/// Ensure the lead has a deal; returns whether one was newly created.
///
/// The existence check avoids a pointless insert in the common case. The
/// unique constraint catches the race where two reconciliation triggers
/// both observe "no deal": the loser's insert returns no row and counts
/// as already satisfied.
async fn ensure_deal(state: &AppState, lead: &Lead) -> Result<bool, AppError> {
    if DealRepo::exists_for_prospect(&state.pool, lead.owner_user_id, &lead.prospect_id).await? {
        return Ok(false);
    }

    let created = DealRepo::insert_if_absent(
        &state.pool,
        &CreateDeal {
            owner_user_id: lead.owner_user_id,
            prospect_id: lead.prospect_id.clone(),
            name: lead.business_name.clone(),
            value: lead.deal_value.unwrap_or(0.0),
            stage: INITIAL_DEAL_STAGE.to_string(),
            deal_type: derive_deal_type(lead.bf_interest, lead.ct_interest, lead.ba_interest)
                .to_string(),
            contact_name: lead.contact_name.clone(),
        },
    )
    .await?;

    match created {
        Some(deal) => {
            state.event_bus.publish(PipelineEvent::new(
                EventKind::Convert,
                lead.owner_user_id,
                deal.id,
                format!("Converted lead {} into a deal", lead.business_name),
            ));
            Ok(true)
        }
        None => Ok(false),
    }
}
