//! Error types used throughout the integration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of an [`ErpError`], used for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Token exchange failed or the credential was rejected
    Authentication,
    /// Upstream returned 429
    RateLimit,
    /// Upstream returned 5xx
    Server,
    /// Upstream returned 4xx other than 401/429
    Client,
    /// No response arrived (connection failure or timeout)
    Network,
    /// Caller supplied bad arguments or upstream returned an unparseable body
    Validation,
    /// Misconfiguration or internal fault
    Config,
}

/// Main error type for erpbridge
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum ErpError {
    #[error("Authentication failed{}: {body}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Authentication { status: Option<u16>, body: String },

    #[error("Error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ErpError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Api { status: 401 | 403, .. } => ErrorCategory::Authentication,
            Self::Api { status: 429, .. } => ErrorCategory::RateLimit,
            Self::Api { status, .. } if *status >= 500 => ErrorCategory::Server,
            Self::Api { .. } => ErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ErrorCategory::Network,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Config(_) | Self::Internal(_) => ErrorCategory::Config,
        }
    }

    /// Upstream HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } => *status,
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for erpbridge operations
pub type Result<T> = std::result::Result<T, ErpError>;
