use std::time::Duration;

use thiserror::Error;

/// A device payload that cannot become a weight reading. Never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedPayload {
    #[error("unsupported payload format `{0}`")]
    UnsupportedFormat(String),
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("payload has no reading object")]
    MissingReading,
    #[error("reading has no `weight` field")]
    MissingWeight,
    #[error("`weight` is not a number: {0}")]
    NonNumericWeight(String),
    #[error("`weight` must be a finite value >= 0, got {0}")]
    InvalidWeight(f64),
}

/// Ledger connectivity, insert or scan failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ledger operation failed: {0:#}")]
    Backend(#[from] anyhow::Error),
    #[error("ledger operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Outbound mail failure. Alerts are not queued for retry.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address {address}: {reason}")]
    Address { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("mail transport rejected the message: {0}")]
    Transport(String),
    #[error("mail relay did not answer within {0:?}")]
    Timeout(Duration),
}

/// Startup configuration problem; aborts the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("setting {key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
