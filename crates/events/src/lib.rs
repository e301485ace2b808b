//! Event bus and notification dispatch for the lead pipeline.
//!
//! Import and conversion operations publish [`PipelineEvent`]s to an
//! in-process [`EventBus`]; the [`NotificationDispatcher`] consumes them
//! and forwards each one to an external webhook, best-effort. The primary
//! operation never waits on, retries, or fails because of delivery.

pub mod bus;
pub mod dispatch;

pub use bus::{EventBus, EventKind, PipelineEvent};
pub use dispatch::NotificationDispatcher;
