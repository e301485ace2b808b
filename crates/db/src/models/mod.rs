//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create/upsert DTO for inserts

pub mod deal;
pub mod import_batch;
pub mod lead;
