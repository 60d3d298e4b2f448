//! Error types for the DDNS system
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure while probing for the public address
    #[error("Public address resolution failed: {0}")]
    ResolutionFailure(String),

    /// The probe answered, but with no address
    #[error("No IPv4 address found in answer for {0}")]
    NoAddressFound(String),

    /// The probe answered with something that is not an IPv4 literal
    #[error("Invalid IPv4 address: '{0}'")]
    InvalidAddress(String),

    /// Provider read succeeded but returned no usable value
    #[error("Invalid record response: {0}")]
    InvalidRecordResponse(String),

    /// Provider write returned a status other than 201 Created
    #[error("Unexpected response status code [{0}]")]
    UnexpectedStatus(u16),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Create a resolution failure
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::ResolutionFailure(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(value: impl Into<String>) -> Self {
        Self::InvalidAddress(value.into())
    }

    /// Create an invalid record response error
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecordResponse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
