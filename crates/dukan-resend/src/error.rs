//! Error for the Resend email channel

use thiserror::Error;

/// Resend Error
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was supplied
    #[error("Resend API key not configured")]
    MissingApiKey,
    /// Non-success response from the emails API
    #[error("Resend API error ({status}): {detail}")]
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

impl From<Error> for dukan::notification::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::MissingApiKey => Self::NotConfigured("RESEND_API_KEY not set".to_string()),
            err => Self::Channel(err.to_string()),
        }
    }
}
