//! HTTP surface for the lead pipeline backend.
//!
//! Handlers orchestrate the pure core logic and the repository layer;
//! everything here is an independent, short-lived unit of work triggered
//! by an inbound request. The owning user is an explicit parameter on
//! every call; there is no ambient session state.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
