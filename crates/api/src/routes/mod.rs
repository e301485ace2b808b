//! Route wiring for the API.

pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/leads/import", post(handlers::import::import_leads))
        .route("/imports", get(handlers::import::list_import_batches))
        .route("/imports/{id}", get(handlers::import::get_import_batch))
        .route("/imports/{id}/revert", post(handlers::import::revert_import))
        .route("/leads/{id}/convert", post(handlers::conversion::convert_lead))
        .route(
            "/conversions/reconcile",
            post(handlers::conversion::reconcile_conversions),
        )
}
