//! Error handling for catalog API operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Result of a single catalog request.
pub type RequestOutcome<T> = Result<T, FetchError>;

/// Errors raised while constructing a [crate::CatalogClient].
#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("invalid catalog url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("catalog url '{0}' cannot be used as a base url")]
    NotABaseUrl(String),
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("failed to build HTTP client")]
    BuildClient(#[source] reqwest::Error),
}

/// Failure of a single catalog request.
///
/// Every request either succeeds or fails with exactly one of these.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connection, timeout or body transfer failure.
    #[error("could not reach the bird catalog")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("bird catalog responded with status {0}")]
    BadStatus(StatusCode),
    #[error("unexpected response from the bird catalog: {0}")]
    MalformedPayload(String),
}

impl FetchError {
    pub(crate) fn network(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        FetchError::Network(Box::new(err))
    }

    pub fn reason(&self) -> FailureReason {
        match self {
            FetchError::Network(_) => FailureReason::NetworkError,
            FetchError::BadStatus(status) => FailureReason::BadStatus(status.as_u16()),
            FetchError::MalformedPayload(_) => FailureReason::MalformedPayload,
        }
    }
}

/// Payload-free classification of a [FetchError].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum FailureReason {
    #[display("network error")]
    NetworkError,
    #[display("bad status ({_0})")]
    BadStatus(u16),
    #[display("malformed payload")]
    MalformedPayload,
}
