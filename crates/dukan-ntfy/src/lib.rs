//! ntfy.sh push notification channel for dukan
//!
//! Publishes order alerts to a ntfy topic. All delivery metadata rides
//! in headers; the body is the message text itself, so the channel
//! works unmodified for both the rich body and the plain-text retry.

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use async_trait::async_trait;
use dukan::notification::{self, NotificationChannel};
use error::Error;

pub mod error;

/// Public ntfy server
pub const DEFAULT_NTFY_URL: &str = "https://ntfy.sh";

/// Priority assigned to order alerts
const PRIORITY: &str = "high";

/// Tags rendered as emoji by the ntfy apps
const TAGS: &str = "shopping_cart,package,star";

/// A ntfy topic publisher
#[derive(Debug, Clone)]
pub struct NtfyChannel {
    client: reqwest::Client,
    endpoint: String,
    topic: String,
}

impl NtfyChannel {
    /// Channel publishing to a topic on the public ntfy server
    pub fn new(topic: String) -> Result<Self, Error> {
        Self::with_endpoint(DEFAULT_NTFY_URL.to_string(), topic)
    }

    /// Channel publishing to a topic on a self-hosted server
    pub fn with_endpoint(endpoint: String, topic: String) -> Result<Self, Error> {
        if topic.is_empty() {
            return Err(Error::MissingTopic);
        }

        Ok(NtfyChannel {
            client: reqwest::Client::new(),
            endpoint,
            topic,
        })
    }
}

#[async_trait]
impl NotificationChannel for NtfyChannel {
    fn name(&self) -> &str {
        "ntfy"
    }

    async fn send(&self, title: &str, body: &str) -> Result<(), notification::Error> {
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, self.topic))
            .header("Title", title)
            .header("Priority", PRIORITY)
            .header("Tags", TAGS)
            .header("Content-Type", "text/plain")
            .body(body.to_string())
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                detail,
            }
            .into());
        }

        tracing::debug!("Published ntfy alert to {}", self.topic);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_topic_rejected() {
        assert!(matches!(
            NtfyChannel::new(String::new()),
            Err(Error::MissingTopic)
        ));
        assert!(NtfyChannel::new("dukan-orders".to_string()).is_ok());
    }
}
