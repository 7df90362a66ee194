//! Errors from the backend API and their mapping into cart errors.

use thiserror::Error;
use tote_core::{SubmitError, SyncError};

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the backend, or a truncated body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or rejected bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl ApiError {
    /// HTTP status associated with this error, if the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Unauthorized(_) => Some(401),
            Self::RateLimited(_) => Some(429),
            Self::Http(_) | Self::Parse(_) => None,
        }
    }
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => Self::Transport(e.to_string()),
            ApiError::Parse(e) => Self::Decode(e.to_string()),
            ApiError::Status { status, message } => Self::Status { status, message },
            other => Self::Status {
                status: other.status().unwrap_or_default(),
                message: other.to_string(),
            },
        }
    }
}

impl From<ApiError> for SubmitError {
    /// Client errors (4xx) are rejections; everything else is a sync failure.
    /// Rate limiting is transient, so it is not treated as a rejection.
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(_) => Self::Rejected("sign in to place an order".to_string()),
            ApiError::Status { status, message } if (400..500).contains(&status) => {
                Self::Rejected(message)
            }
            ApiError::NotFound(what) => Self::Rejected(format!("not found: {what}")),
            other => Self::Sync(other.into()),
        }
    }
}
