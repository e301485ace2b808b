//! Request handlers, grouped by operation family.

pub mod conversion;
pub mod import;
