//! Contract between a [`crate::CartStore`] and a remote cart.
//!
//! The store never performs I/O itself. When a deployment keeps the
//! authoritative cart on the backend, it hands the store a [`CartSync`]
//! implementation (the HTTP client in `tote-client`, or an in-memory fake in
//! tests). Stores without one use [`Detached`].

use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartChange;
use crate::error::SyncError;
use crate::types::{CartLineId, ProductId, lenient};

/// A cart line as reported by the remote cart.
///
/// `unitPrice` (or `price`) and `quantity` may be JSON numbers or numeric
/// strings; both are normalized on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartLine {
    /// Backend line id.
    #[serde(default, rename = "cartId", skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<CartLineId>,
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(alias = "price", deserialize_with = "lenient::decimal")]
    pub unit_price: Decimal,
    #[serde(deserialize_with = "lenient::quantity")]
    pub quantity: u32,
}

/// A remote cart that local mutations are pushed to and re-fetched from.
///
/// Calls may race with each other; the store treats the latest successful
/// [`CartSync::fetch`] as the truth.
pub trait CartSync {
    /// Fetch the full remote cart.
    fn fetch(&self) -> impl Future<Output = Result<Vec<RemoteCartLine>, SyncError>> + Send;

    /// Apply one change to the remote cart.
    fn push(&self, change: &CartChange) -> impl Future<Output = Result<(), SyncError>> + Send;
}

/// Marker for a store with no remote cart. Cannot be constructed.
#[derive(Debug, Clone, Copy)]
pub enum Detached {}

impl CartSync for Detached {
    async fn fetch(&self) -> Result<Vec<RemoteCartLine>, SyncError> {
        match *self {}
    }

    async fn push(&self, _change: &CartChange) -> Result<(), SyncError> {
        match *self {}
    }
}
