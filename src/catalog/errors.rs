//! Catalog Errors

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP client could not be built.
    #[error("failed to build catalog HTTP client")]
    Client(#[source] reqwest::Error),

    /// Transport failure or timeout.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status, with the response body.
    #[error("catalog responded with {status}: {body}")]
    UnexpectedStatus {
        /// Response status
        status: StatusCode,

        /// Response body, possibly empty
        body: String,
    },

    /// Response body was not the expected JSON.
    #[error("failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}
