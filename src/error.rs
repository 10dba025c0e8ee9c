//! Error types for the Stacking Tracker SDK

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the wallet connection flow
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet provider could be resolved, the user has to pick one
    #[error("No wallet provider available")]
    NoProviderAvailable,

    /// The user declined the request or the extension failed
    #[error("Connection rejected: {0}")]
    ConnectionRejected(String),

    /// The wallet did not answer in time
    #[error("Connection timed out after {0:?}")]
    ConnectionTimeout(Duration),

    /// Writing to the system clipboard failed
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// The preference store could not be read or written
    #[error("Preference store error: {0}")]
    Preference(String),
}

impl WalletError {
    /// Creates a ConnectionRejected error
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::ConnectionRejected(msg.into())
    }
}

/// Errors that can occur when fetching positions
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network request failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request did not complete in time
    #[error("Fetch timed out after {0:?}")]
    FetchTimeout(Duration),
}

/// Errors that can occur when refreshing ticker prices
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The underlying HTTP call failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Provider throttled us (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Provider answered but quoted none of the requested assets
    #[error("No quotes returned for {0}")]
    MissingQuotes(String),
}

impl ProviderError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderError::MissingQuotes(_))
    }
}

/// Errors that can occur when reading ticker prices
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PriceError {
    /// Price data not yet available (never fetched)
    #[error("Price data not available for {asset}")]
    NotAvailable { asset: String },

    /// Price data is too old (stale)
    #[error("Price data for {asset} is stale (age: {age:?})")]
    Stale { asset: String, age: Duration },
}

impl PriceError {
    /// Creates a NotAvailable error
    pub fn not_available(asset: &str) -> Self {
        Self::NotAvailable {
            asset: asset.to_string(),
        }
    }

    /// Creates a Stale error
    pub fn stale(asset: &str, age: Duration) -> Self {
        Self::Stale {
            asset: asset.to_string(),
            age,
        }
    }
}

/// Errors raised while reading runtime settings
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds an unusable value
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}
