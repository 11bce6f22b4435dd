//! Payment gateway interfaces.
//!
//! Two external collaborators sit behind traits here: the server-side
//! provider that creates payment intents, and the hosted payment sheet
//! that collects the actual payment from the customer. Backend crates
//! implement [`PaymentGateway`]; the UI shell implements
//! [`PaymentCollector`] over the provider's SDK handoff.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::CustomerDetails;
use crate::Amount;

/// Currency every order is charged in
pub const CURRENCY: &str = "INR";

/// Payment Error
#[derive(Debug, Error)]
pub enum Error {
    /// Provider credentials are not configured
    #[error("Payment provider credentials are not configured")]
    MissingCredentials,
    /// Provider rejected the request
    #[error("Payment provider error: {0}")]
    Provider(String),
    /// Intent creation did not finish within the configured timeout
    #[error("Timed out creating payment intent")]
    Timeout,
    /// Anyhow error
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Request to create a payment intent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRequest {
    /// Amount in major units (rupees)
    pub amount: Amount,
    /// Currency code
    pub currency: String,
    /// Caller-supplied receipt reference, defaulted by the backend when
    /// absent
    pub receipt: Option<String>,
}

impl IntentRequest {
    /// Intent request for an amount in the fixed store currency
    pub fn new(amount: Amount, receipt: Option<String>) -> Self {
        IntentRequest {
            amount,
            currency: CURRENCY.to_string(),
            receipt,
        }
    }
}

/// A provider-tracked pending charge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Opaque provider identifier, handed to the payment sheet
    pub id: String,
    /// Amount in minor units (paise), as the provider echoes it
    #[serde(rename = "amount")]
    pub amount_minor: u64,
    /// Currency code
    pub currency: String,
}

/// How the payment sheet resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectOutcome {
    /// Customer paid; the reference identifies the payment
    Paid {
        /// Provider payment reference
        reference: String,
    },
    /// Customer dismissed the sheet; a clean abort, not an error
    Dismissed,
}

/// Server-side payment-intent creation
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a provider-tracked payment intent for the given amount
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, Error>;
}

/// The externally rendered payment sheet.
///
/// `collect` suspends for as long as the customer takes; callers that
/// need to abandon the wait cancel through the pipeline's dismiss signal
/// rather than through this trait.
#[async_trait]
pub trait PaymentCollector: Send + Sync {
    /// Hand the intent to the payment sheet and wait for the customer
    async fn collect(
        &self,
        intent: &PaymentIntent,
        prefill: &CustomerDetails,
    ) -> Result<CollectOutcome, Error>;
}
