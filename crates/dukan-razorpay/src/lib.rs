//! Razorpay payment gateway backend for dukan
//!
//! Creates payment intents through the Razorpay Orders API. Razorpay
//! denominates in minor units, so the rupee amount is converted to
//! paise on the way out.

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use async_trait::async_trait;
use dukan::payment::{self, IntentRequest, PaymentGateway, PaymentIntent};
use dukan::util::unix_time;
use error::Error;
use serde::Serialize;

pub mod error;

/// Production Razorpay API base
pub const RAZORPAY_API_URL: &str = "https://api.razorpay.com";

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
}

/// Razorpay orders client
#[derive(Debug, Clone)]
pub struct RazorpayGateway {
    client: reqwest::Client,
    api_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    /// Create a gateway against the production API
    pub fn new(key_id: String, key_secret: String) -> Result<Self, Error> {
        Self::with_api_url(RAZORPAY_API_URL.to_string(), key_id, key_secret)
    }

    /// Create a gateway against a specific API base, used in tests
    pub fn with_api_url(
        api_url: String,
        key_id: String,
        key_secret: String,
    ) -> Result<Self, Error> {
        if key_id.is_empty() || key_secret.is_empty() {
            return Err(Error::MissingCredentials);
        }

        Ok(RazorpayGateway {
            client: reqwest::Client::new(),
            api_url,
            key_id,
            key_secret,
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, payment::Error> {
        let receipt = request
            .receipt
            .unwrap_or_else(|| format!("receipt_{}", unix_time()));

        let body = CreateOrderBody {
            amount: request.amount.to_paise(),
            currency: &request.currency,
            receipt: &receipt,
        };

        tracing::debug!(
            "Creating Razorpay order for {} paise (receipt {})",
            body.amount,
            receipt
        );

        let response = self
            .client
            .post(format!("{}/v1/orders", self.api_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!("Razorpay order creation failed ({}): {}", status, detail);
            return Err(Error::Api {
                status: status.as_u16(),
                detail,
            }
            .into());
        }

        let intent = response
            .json::<PaymentIntent>()
            .await
            .map_err(Error::from)?;

        tracing::info!("Created Razorpay order {}", intent.id);

        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(matches!(
            RazorpayGateway::new(String::new(), "secret".to_string()),
            Err(Error::MissingCredentials)
        ));
        assert!(matches!(
            RazorpayGateway::new("rzp_test_key".to_string(), String::new()),
            Err(Error::MissingCredentials)
        ));
        assert!(RazorpayGateway::new("rzp_test_key".to_string(), "secret".to_string()).is_ok());
    }

    #[test]
    fn test_order_body_is_minor_units() {
        let body = CreateOrderBody {
            amount: dukan::Amount::from(660).to_paise(),
            currency: "INR",
            receipt: "order_rcptid_1",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"], 66_000);
        assert_eq!(json["currency"], "INR");
    }
}
