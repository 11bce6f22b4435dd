//! Seller notification channels.
//!
//! Channels are independent, best-effort transports. Every channel is
//! attempted for every order; a failing channel is retried exactly once
//! with the reduced plain-text payload, and whatever happens the outcome
//! is recorded rather than propagated. Nothing here can fail an order.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Notification Error
#[derive(Debug, Error)]
pub enum Error {
    /// Channel credentials are absent; the channel is skipped, not failed
    #[error("Channel not configured: {0}")]
    NotConfigured(String),
    /// Transport or provider failure
    #[error("{0}")]
    Channel(String),
    /// Anyhow error
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// What a channel is asked to deliver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Short title line
    pub title: String,
    /// Rich body, first attempt
    pub body: String,
    /// Plain-text body used for the single retry
    pub fallback_body: String,
}

/// One external notification transport
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Stable channel name used in result records
    fn name(&self) -> &str;

    /// Deliver one message
    async fn send(&self, title: &str, body: &str) -> Result<(), Error>;
}

/// Terminal outcome of one channel for one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOutcome {
    /// Delivered
    Ok,
    /// Both attempts failed
    Failed(String),
    /// Channel was not configured
    Skipped(String),
}

impl std::fmt::Display for ChannelOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelOutcome::Ok => write!(f, "ok"),
            ChannelOutcome::Failed(reason) => write!(f, "failed: {reason}"),
            ChannelOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
        }
    }
}

/// Per-channel outcome record, kept for observability only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelResult {
    /// Channel name
    pub channel: String,
    /// What happened
    pub outcome: ChannelOutcome,
}

async fn send_with_fallback(
    channel: &dyn NotificationChannel,
    payload: &NotificationPayload,
) -> ChannelResult {
    let outcome = match channel.send(&payload.title, &payload.body).await {
        Ok(()) => ChannelOutcome::Ok,
        Err(Error::NotConfigured(reason)) => {
            tracing::debug!("Notification channel {} skipped: {}", channel.name(), reason);
            ChannelOutcome::Skipped(reason)
        }
        Err(err) => {
            tracing::warn!(
                "Notification channel {} failed, retrying with plain payload: {}",
                channel.name(),
                err
            );

            match channel.send(&payload.title, &payload.fallback_body).await {
                Ok(()) => ChannelOutcome::Ok,
                Err(Error::NotConfigured(reason)) => ChannelOutcome::Skipped(reason),
                Err(retry_err) => {
                    tracing::error!(
                        "Notification channel {} failed after retry: {}",
                        channel.name(),
                        retry_err
                    );
                    ChannelOutcome::Failed(retry_err.to_string())
                }
            }
        }
    };

    ChannelResult {
        channel: channel.name().to_string(),
        outcome,
    }
}

/// Attempt every channel and collect the outcomes. All channels are
/// attempted before the combined results are returned; no channel's
/// failure affects another's invocation.
pub async fn dispatch(
    channels: &[Arc<dyn NotificationChannel>],
    payload: &NotificationPayload,
) -> Vec<ChannelResult> {
    futures::future::join_all(
        channels
            .iter()
            .map(|channel| send_with_fallback(channel.as_ref(), payload)),
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FlakyChannel {
        name: &'static str,
        fail_first: usize,
        attempts: AtomicUsize,
        bodies: std::sync::Mutex<Vec<String>>,
    }

    impl FlakyChannel {
        fn new(name: &'static str, fail_first: usize) -> Self {
            FlakyChannel {
                name,
                fail_first,
                attempts: AtomicUsize::new(0),
                bodies: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NotificationChannel for FlakyChannel {
        fn name(&self) -> &str {
            self.name
        }

        async fn send(&self, _title: &str, body: &str) -> Result<(), Error> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            self.bodies.lock().unwrap().push(body.to_string());

            if attempt < self.fail_first {
                Err(Error::Channel("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct UnconfiguredChannel;

    #[async_trait]
    impl NotificationChannel for UnconfiguredChannel {
        fn name(&self) -> &str {
            "email"
        }

        async fn send(&self, _title: &str, _body: &str) -> Result<(), Error> {
            Err(Error::NotConfigured("api key not set".to_string()))
        }
    }

    fn payload() -> NotificationPayload {
        NotificationPayload {
            title: "New Order".to_string(),
            body: "🛍️ rich".to_string(),
            fallback_body: "plain".to_string(),
        }
    }

    #[tokio::test]
    async fn test_failure_retries_once_with_fallback() {
        let channel = Arc::new(FlakyChannel::new("ntfy", 1));
        let channels: Vec<Arc<dyn NotificationChannel>> = vec![channel.clone()];

        let results = dispatch(&channels, &payload()).await;

        assert_eq!(results[0].outcome, ChannelOutcome::Ok);
        assert_eq!(channel.attempts.load(Ordering::SeqCst), 2);
        let bodies = channel.bodies.lock().unwrap();
        assert_eq!(bodies.as_slice(), &["🛍️ rich".to_string(), "plain".to_string()]);
    }

    #[tokio::test]
    async fn test_exactly_one_retry_then_failure_recorded() {
        let channel = Arc::new(FlakyChannel::new("ntfy", 10));
        let channels: Vec<Arc<dyn NotificationChannel>> = vec![channel.clone()];

        let results = dispatch(&channels, &payload()).await;

        assert!(matches!(results[0].outcome, ChannelOutcome::Failed(_)));
        assert_eq!(channel.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_channels_are_independent() {
        let failing = Arc::new(FlakyChannel::new("ntfy", 10));
        let channels: Vec<Arc<dyn NotificationChannel>> =
            vec![failing, Arc::new(UnconfiguredChannel)];

        let results = dispatch(&channels, &payload()).await;

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0].outcome, ChannelOutcome::Failed(_)));
        assert_eq!(
            results[1].outcome,
            ChannelOutcome::Skipped("api key not set".to_string())
        );
        assert_eq!(results[1].outcome.to_string(), "skipped: api key not set");
    }
}
