//! Best-effort notification of generation events.
//!
//! Every generated notice or receipt is reported by email to a fixed,
//! externally configured address. Delivery is attempted once; failures are
//! logged and never reach the caller.

mod email;
mod relay;

pub use email::{compose, EmailMessage};
pub use relay::HttpRelayTransport;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::NotifyConfig;
use crate::models::GeneratedRecord;

/// What a notification describes: the kind plus the full record.
pub type NotificationPayload = GeneratedRecord;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("notification relay responded with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Reports a generation event. Implementations swallow their own failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, payload: &NotificationPayload);
}

/// A single delivery attempt that may fail.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send(
        &self,
        message: &EmailMessage,
        payload: &NotificationPayload,
    ) -> Result<(), NotifyError>;
}

/// Composes the notification email and hands it to a transport, logging any failure.
pub struct EmailNotifier {
    transport: Arc<dyn NotificationTransport>,
    from: String,
    to: String,
}

impl EmailNotifier {
    pub fn new(
        transport: Arc<dyn NotificationTransport>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            from: from.into(),
            to: to.into(),
        }
    }

    /// Relay-backed notifier when an endpoint is configured, log-only otherwise.
    pub fn from_config(config: &NotifyConfig, client: reqwest::Client) -> Self {
        let to = config.to.clone().unwrap_or_default();
        let from = config.from.clone().unwrap_or_else(|| to.clone());

        let transport: Arc<dyn NotificationTransport> = match &config.endpoint {
            Some(endpoint) => Arc::new(HttpRelayTransport::new(
                client,
                endpoint.clone(),
                config.api_key.clone(),
            )),
            None => {
                log::warn!("NOTIFY_ENDPOINT not set; generation events will only be logged");
                Arc::new(LogTransport)
            }
        };

        Self::new(transport, from, to)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, payload: &NotificationPayload) {
        let message = compose(payload, &self.from, &self.to);

        match self.transport.send(&message, payload).await {
            Ok(()) => log::info!(
                "Notification sent for {} {}",
                payload.kind(),
                payload.id()
            ),
            Err(e) => log::error!(
                "Notification for {} {} failed: {}",
                payload.kind(),
                payload.id(),
                e
            ),
        }
    }
}

/// Transport that only writes the message to the log.
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn send(
        &self,
        message: &EmailMessage,
        _payload: &NotificationPayload,
    ) -> Result<(), NotifyError> {
        log::info!("Notification (not delivered): {}", message.subject);
        Ok(())
    }
}
