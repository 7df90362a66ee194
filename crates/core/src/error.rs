//! Error types for cart operations.

use thiserror::Error;

use crate::types::{PriceError, ProductId};

/// Errors returned by cart and checkout operations.
///
/// Every operation that returns one of these has left the cart exactly as it
/// was before the call, with one exception: [`CartError::Sync`] raised while
/// pushing or re-fetching after a mutation, where the local mutation has
/// already been applied and is kept.
#[derive(Debug, Error)]
pub enum CartError {
    /// The operation needs an existing line for this product.
    #[error("Product {0} is not in the cart")]
    NotFound(ProductId),

    /// An argument was out of range (negative price, bad quantity, bad address).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote cart or order service could not be reached or answered badly.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// The order service declined the order.
    #[error("Order rejected: {0}")]
    OrderRejected(String),
}

impl From<PriceError> for CartError {
    fn from(err: PriceError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Errors reported by a remote cart or order adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The request never produced a response (connection, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with a non-success status.
    #[error("Remote returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Short description or truncated response body.
        message: String,
    },

    /// The remote payload could not be turned into cart state.
    #[error("Invalid remote payload: {0}")]
    Decode(String),
}

/// Errors reported by an order submitter.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The order service refused the order (empty cart, not signed in, ...).
    #[error("{0}")]
    Rejected(String),

    /// The order service could not be reached or answered badly.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl From<SubmitError> for CartError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Rejected(reason) => Self::OrderRejected(reason),
            SubmitError::Sync(err) => Self::Sync(err),
        }
    }
}
