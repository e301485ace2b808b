//! Best-effort webhook notification dispatch.
//!
//! [`NotificationDispatcher`] consumes events from the bus and POSTs each
//! one to a configured webhook URL. Delivery is fire-and-forget: a single
//! attempt per event, failures logged and dropped, never retried and never
//! surfaced to the operation that published the event.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::bus::PipelineEvent;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for a failed delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote endpoint returned a non-2xx status code.
    #[error("Notification endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

/// Forwards pipeline events to an external notification endpoint.
pub struct NotificationDispatcher {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl NotificationDispatcher {
    /// Create a dispatcher. With no `webhook_url` configured, events are
    /// consumed and logged at debug level only.
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            webhook_url,
        }
    }

    /// Run the dispatch loop.
    ///
    /// Consumes events from `receiver` until the channel closes (i.e. the
    /// [`EventBus`](crate::EventBus) is dropped). Intended to be spawned
    /// as a background task so delivery runs concurrently with, and never
    /// blocks, the request that triggered the event.
    pub async fn run(self, mut receiver: broadcast::Receiver<PipelineEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.dispatch(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver one event, logging the outcome. A failure is final: the
    /// primary operation already succeeded and must not be rolled back or
    /// retried on the notifier's behalf.
    async fn dispatch(&self, event: &PipelineEvent) {
        let Some(url) = &self.webhook_url else {
            tracing::debug!(kind = %event.kind, "No notification webhook configured, dropping event");
            return;
        };

        match self.try_send(url, event).await {
            Ok(()) => {
                tracing::debug!(kind = %event.kind, subject_id = event.subject_id, "Notification delivered");
            }
            Err(e) => {
                tracing::warn!(
                    kind = %event.kind,
                    subject_id = event.subject_id,
                    error = %e,
                    "Notification delivery failed, dropping event"
                );
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, event: &PipelineEvent) -> Result<(), DispatchError> {
        let response = self.client.post(url).json(event).send().await?;
        if !response.status().is_success() {
            return Err(DispatchError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
