//! Resend transactional email channel for dukan
//!
//! Sends order alert emails through the Resend API. The channel is
//! constructed even when no API key is configured; it then reports
//! itself as skipped on every dispatch instead of failing, so email
//! stays strictly optional.

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use async_trait::async_trait;
use dukan::notification::{self, NotificationChannel};
use error::Error;
use serde::Serialize;

pub mod error;

/// Resend API base
pub const RESEND_API_URL: &str = "https://api.resend.com";

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Resend emails client
#[derive(Debug, Clone)]
pub struct ResendChannel {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
    to: String,
}

impl ResendChannel {
    /// Channel sending through the production API
    pub fn new(api_key: Option<String>, from: String, to: String) -> Self {
        Self::with_api_url(RESEND_API_URL.to_string(), api_key, from, to)
    }

    /// Channel sending through a specific API base, used in tests
    pub fn with_api_url(
        api_url: String,
        api_key: Option<String>,
        from: String,
        to: String,
    ) -> Self {
        ResendChannel {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
            to,
        }
    }
}

#[async_trait]
impl NotificationChannel for ResendChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, title: &str, body: &str) -> Result<(), notification::Error> {
        let api_key = self.api_key.as_ref().ok_or(Error::MissingApiKey)?;

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(api_key)
            .json(&SendEmailBody {
                from: &self.from,
                to: &self.to,
                subject: title,
                text: body,
            })
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

        tracing::debug!("Sent order email to {}", self.to);

        Ok(())
    }
}
