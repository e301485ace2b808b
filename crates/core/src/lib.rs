//! Pure domain logic for the lead pipeline backend.
//!
//! This crate has no database, async, or I/O dependencies. It provides:
//!
//! - CSV lead-record normalization ([`lead_import`])
//! - Lead and import-batch status enums with string conversions
//! - Import batch lifecycle rules and the staleness policy ([`batch`])
//! - Deal-type derivation for lead conversion ([`conversion`])
//! - The shared domain error type ([`error::CoreError`])

pub mod batch;
pub mod conversion;
pub mod error;
pub mod lead;
pub mod lead_import;
pub mod types;
