//! Order placement and order history.

use reqwest::Method;
use serde::Deserialize;
use tote_core::{OrderConfirmation, OrderRecord, OrderRequest, OrderSubmitter, SubmitError};
use tracing::{info, instrument, warn};

use super::{ApiClient, preview};
use crate::error::ApiError;

#[derive(Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    orders: Vec<OrderRecord>,
}

impl ApiClient {
    /// Submit an order.
    ///
    /// Any success status means the order was placed. The order id is taken
    /// from the body when it carries one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses the order.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.summary.total))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, ApiError> {
        let body = self
            .execute(self.request(Method::POST, "orders").json(order))
            .await?;
        let confirmation = if body.trim().is_empty() {
            OrderConfirmation::default()
        } else {
            serde_json::from_str(&body).unwrap_or_else(|e| {
                warn!(error = %e, body = %preview(&body), "Order accepted without a readable id");
                OrderConfirmation::default()
            })
        };
        match confirmation.order_id {
            Some(order_id) => info!(%order_id, "Order created"),
            None => info!("Order created"),
        }
        Ok(confirmation)
    }

    /// List the signed-in user's past orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a valid token, or another
    /// error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderRecord>, ApiError> {
        let response: OrdersResponse = self
            .execute_json(self.request(Method::GET, "orders"))
            .await?;
        let mut orders = response.orders;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

impl OrderSubmitter for ApiClient {
    /// Refuses up front when no token is held; the backend would reject the
    /// order anyway.
    async fn submit(&self, order: &OrderRequest) -> Result<OrderConfirmation, SubmitError> {
        if !self.has_token().await {
            return Err(SubmitError::Rejected("sign in to place an order".to_string()));
        }
        Ok(self.create_order(order).await?)
    }
}
