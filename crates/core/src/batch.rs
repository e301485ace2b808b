//! Import batch lifecycle rules.
//!
//! The provenance ledger (`import_batches`) is the single source of truth
//! for whether a batch has been undone. This module defines the status
//! enum, the legal transitions between statuses, and the staleness policy
//! for batches stuck in `processing` after a crash or client disconnect.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Minutes after which a `processing` batch is considered abandoned.
///
/// A batch only stays in `processing` for the duration of one import
/// request; anything older was orphaned by a crash or disconnect and is
/// reported (and lazily transitioned) as `failed` on the next ledger read.
pub const PROCESSING_STALE_AFTER_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Batch Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an import batch.
///
/// Legal transitions:
///
/// ```text
/// processing -> completed | failed
/// completed  -> reverted
/// ```
///
/// `failed` and `reverted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Processing,
    Completed,
    Failed,
    Reverted,
}

impl BatchStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Reverted => "reverted",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "reverted" => Some(Self::Reverted),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["processing", "completed", "failed", "reverted"];

    /// Whether a transition from `self` to `to` is legal.
    pub fn can_transition_to(&self, to: BatchStatus) -> bool {
        matches!(
            (self, to),
            (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
                | (Self::Completed, Self::Reverted)
        )
    }

    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Reverted)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Staleness
// ---------------------------------------------------------------------------

/// Whether a batch created at `created_at` with the given status is a stale
/// `processing` row as of `now`.
pub fn is_stale(
    status: BatchStatus,
    created_at: Timestamp,
    now: Timestamp,
    stale_after_mins: i64,
) -> bool {
    status == BatchStatus::Processing && now - created_at > Duration::minutes(stale_after_mins)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
