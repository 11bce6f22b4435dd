//! Error for the Razorpay gateway backend

use thiserror::Error;

/// Razorpay Error
#[derive(Debug, Error)]
pub enum Error {
    /// Key id or key secret missing
    #[error("Razorpay credentials not configured")]
    MissingCredentials,
    /// Non-success response from the orders API
    #[error("Razorpay API error ({status}): {detail}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body returned by the API
        detail: String,
    },
    /// Transport error
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// Anyhow error
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<Error> for dukan::payment::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::MissingCredentials => Self::MissingCredentials,
            err => Self::Provider(err.to_string()),
        }
    }
}
