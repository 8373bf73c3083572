//! mailhook chat adapter.
//!
//! Implements the [`relay::NotificationDispatcher`] trait for Slack incoming
//! webhooks: one JSON `POST` to `https://hooks.slack.com/services/<token>` per
//! notification.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Serialisation, request construction and HTTP transport
//! live here. The [`relay`] crate sees only [`relay::NotificationDispatcher`].
//!
//! ## Sharing
//!
//! [`SlackWebhookClient`] wraps a [`reqwest::Client`], which pools connections
//! internally and is safe to use from many tasks at once. Clone it (cheap) or
//! put it behind an `Arc`; never build one per request.
//!
//! No timeout is applied unless [`SlackWebhookClient::with_timeout`] is used,
//! and nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use tracing::{debug, warn};

use relay::{DispatchError, DispatchStatus, NotificationDispatcher, OutboundNotification, Secret};

/// Base URL of Slack incoming webhooks; the token is appended verbatim.
pub const SLACK_WEBHOOK_BASE_URL: &str = "https://hooks.slack.com/services/";

/// Posts notifications to one Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackWebhookClient {
    client: reqwest::Client,
    base_url: String,
    token: Secret,
    timeout: Option<Duration>,
}

impl SlackWebhookClient {
    /// Creates a client for the webhook identified by `token`.
    pub fn new(client: reqwest::Client, token: Secret) -> Self {
        Self {
            client,
            base_url: SLACK_WEBHOOK_BASE_URL.to_string(),
            token,
            timeout: None,
        }
    }

    /// Replaces the webhook base URL (used to target a local test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bounds every dispatch by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn webhook_url(&self) -> String {
        format!("{}{}", self.base_url, self.token.expose())
    }
}

#[async_trait]
impl NotificationDispatcher for SlackWebhookClient {
    async fn dispatch(
        &self,
        notification: &OutboundNotification,
    ) -> Result<DispatchStatus, DispatchError> {
        let body = serde_json::to_vec(notification).map_err(|e| DispatchError::Serialize {
            message: e.to_string(),
        })?;

        // The URL carries the webhook token, so it is kept out of error text.
        let url = reqwest::Url::parse(&self.webhook_url()).map_err(|e| {
            DispatchError::BuildRequest {
                message: e.to_string(),
            }
        })?;

        let mut builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let request = builder.build().map_err(|e| DispatchError::BuildRequest {
            message: e.without_url().to_string(),
        })?;

        debug!(channel = %notification.channel, "Posting chat notification");
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| DispatchError::Transport {
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Chat webhook returned a non-success status");
        }

        Ok(DispatchStatus {
            code: status.as_u16(),
            line: status_line(status),
        })
    }
}

/// Formats a status as an HTTP status line, e.g. `"404 Not Found"`.
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
