//! Live adapters for the `Notifier` port.

use reqwest::Client;
use serde::Serialize;

use crate::error::PortError;
use crate::ports::notify::{Notification, Notifier};
use crate::ports::tasks::PortFuture;

/// Posts notifications as JSON to an HTTP endpoint.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// Creates a notifier posting to `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: Client::new(), url: url.into() }
    }
}

/// Request body sent to the webhook.
#[derive(Serialize)]
struct WebhookBody<'a> {
    identity: &'a str,
    #[serde(flatten)]
    notification: &'a Notification,
}

impl WebhookNotifier {
    async fn post(&self, identity: &str, notification: &Notification) -> Result<(), PortError> {
        let body = WebhookBody { identity, notification };
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Notification request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Notification endpoint returned {}", status.as_u16()).into());
        }
        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    fn notify<'a>(
        &'a self,
        identity: &'a str,
        notification: &'a Notification,
    ) -> PortFuture<'a, ()> {
        Box::pin(self.post(identity, notification))
    }
}

/// Writes notifications to the log instead of delivering them.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify<'a>(
        &'a self,
        identity: &'a str,
        notification: &'a Notification,
    ) -> PortFuture<'a, ()> {
        tracing::info!(
            identity,
            kind = %notification.kind,
            task_id = notification.task_id.as_deref().unwrap_or(""),
            "{}",
            notification.message
        );
        Box::pin(std::future::ready(Ok(())))
    }
}
