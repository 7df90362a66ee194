//! Remote cart endpoints, exposed to the store through [`CartSync`].

use reqwest::Method;
use serde::Serialize;
use tote_core::{CartChange, CartLineId, CartSync, ProductId, RemoteCartLine, SyncError};
use tracing::instrument;

use super::ApiClient;
use crate::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddToCart {
    product_id: ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct UpdateQuantity {
    quantity: u32,
}

/// Path segment addressing a cart line: the backend line id when known,
/// otherwise the product id.
fn line_segment(product_id: ProductId, remote_id: Option<CartLineId>) -> String {
    remote_id.map_or_else(|| product_id.to_string(), |id| id.to_string())
}

impl ApiClient {
    /// Fetch the remote cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Vec<RemoteCartLine>, ApiError> {
        self.execute_json(self.request(Method::GET, "cart")).await
    }

    /// Apply one cart change on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses it.
    #[instrument(skip(self), fields(product_id = %change.product_id()))]
    pub async fn apply_cart_change(&self, change: &CartChange) -> Result<(), ApiError> {
        let request = match *change {
            CartChange::Added { product_id, .. } => self
                .request(Method::POST, "cart/add")
                .json(&AddToCart {
                    product_id,
                    quantity: 1,
                }),
            CartChange::QuantitySet {
                product_id,
                remote_id,
                quantity,
            } => self
                .request(
                    Method::PUT,
                    &format!("cart/update/{}", line_segment(product_id, remote_id)),
                )
                .json(&UpdateQuantity { quantity }),
            CartChange::Removed {
                product_id,
                remote_id,
            } => self.request(
                Method::DELETE,
                &format!("cart/remove/{}", line_segment(product_id, remote_id)),
            ),
        };

        self.execute(request).await.map(|_| ())
    }
}

impl CartSync for ApiClient {
    async fn fetch(&self) -> Result<Vec<RemoteCartLine>, SyncError> {
        Ok(self.get_cart().await?)
    }

    async fn push(&self, change: &CartChange) -> Result<(), SyncError> {
        Ok(self.apply_cart_change(change).await?)
    }
}
