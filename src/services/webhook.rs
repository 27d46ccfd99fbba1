use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::models::api::WebhookPayload;

/// Delivers processing results to a record's webhook.
#[async_trait]
pub trait WebhookNotifier: Send + Sync {
    async fn notify(&self, webhook_url: &str, payload: &WebhookPayload) -> Result<(), WebhookError>;
}

pub struct HttpWebhookNotifier {
    http: Client,
}

impl HttpWebhookNotifier {
    pub fn new(timeout: Option<Duration>) -> Result<Self, WebhookError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build().map_err(WebhookError::Http)?,
        })
    }
}

#[async_trait]
impl WebhookNotifier for HttpWebhookNotifier {
    /// POST the payload as JSON; a non-2xx reply counts as a failed delivery.
    async fn notify(
        &self,
        webhook_url: &str,
        payload: &WebhookPayload,
    ) -> Result<(), WebhookError> {
        let response = self
            .http
            .post(webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(WebhookError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Webhook delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook responded with status {0}")]
    Rejected(u16),
}
