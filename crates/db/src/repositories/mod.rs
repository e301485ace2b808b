//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod deal_repo;
pub mod import_batch_repo;
pub mod lead_repo;

pub use deal_repo::DealRepo;
pub use import_batch_repo::ImportBatchRepo;
pub use lead_repo::LeadRepo;
