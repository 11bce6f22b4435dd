//! Error for the ntfy.sh channel

use thiserror::Error;

/// Ntfy Error
#[derive(Debug, Error)]
pub enum Error {
    /// Topic is empty
    #[error("ntfy topic not configured")]
    MissingTopic,
    /// Non-success response from the ntfy server
    #[error("ntfy error ({status}): {detail}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body returned by the server
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
            Error::MissingTopic => Self::NotConfigured("ntfy topic not set".to_string()),
            err => Self::Channel(err.to_string()),
        }
    }
}
