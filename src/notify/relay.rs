use async_trait::async_trait;
use serde::Serialize;

use super::{EmailMessage, NotificationPayload, NotificationTransport, NotifyError};

#[derive(Serialize)]
struct RelayRequest<'a> {
    #[serde(flatten)]
    message: &'a EmailMessage,
    payload: &'a NotificationPayload,
}

/// Posts the composed email as JSON to an HTTP mail relay.
pub struct HttpRelayTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpRelayTransport {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl NotificationTransport for HttpRelayTransport {
    async fn send(
        &self,
        message: &EmailMessage,
        payload: &NotificationPayload,
    ) -> Result<(), NotifyError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&RelayRequest { message, payload });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!("Mail relay accepted notification ({})", status);
        Ok(())
    }
}
