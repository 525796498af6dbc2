//! Posting sinks.
//!
//! A sink receives rendered notification messages for a channel. The
//! production sink posts each message to a chat webhook as JSON; tests
//! substitute an in-memory implementation.

use serde::Serialize;
use tracing::debug;

use crate::config::SinkConfig;
use crate::{FeedbeatError, Result};

/// Destination for rendered notification messages.
pub trait PostSink {
    /// Post one message to a channel. `kind` tags the post so clients
    /// can apply custom rendering.
    fn post(
        &self,
        channel_id: &str,
        message: &str,
        kind: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Serialize)]
struct WebhookPost<'a> {
    channel_id: &'a str,
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

/// Sink that delivers posts to a chat webhook endpoint.
pub struct WebhookSink {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookSink {
    /// Build a sink from configuration.
    pub fn new(config: &SinkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("feedbeat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedbeatError::Post(e.to_string()))?;

        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
        })
    }
}

impl PostSink for WebhookSink {
    async fn post(&self, channel_id: &str, message: &str, kind: &str) -> Result<()> {
        let body = WebhookPost {
            channel_id,
            message,
            kind,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FeedbeatError::Post(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedbeatError::Post(format!(
                "webhook returned {} for channel {}",
                status, channel_id
            )));
        }

        debug!(channel_id = %channel_id, "posted notification");
        Ok(())
    }
}
