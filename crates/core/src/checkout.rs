//! Checkout pricing and the order submission contract.
//!
//! # Pricing
//!
//! | Component | Rule |
//! |-----------|------|
//! | subtotal | grand total of the cart |
//! | delivery | free when subtotal is above 1000, otherwise 50 |
//! | tax | 18% of subtotal, rounded to cents |
//! | total | subtotal + delivery + tax |
//!
//! These are fixed store policy, not configuration.

use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartState;
use crate::error::{CartError, SubmitError};
use crate::types::{OrderId, Price, ProductId};

/// Subtotals strictly above this ship free.
pub const FREE_DELIVERY_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Flat delivery charge below the threshold.
pub const DELIVERY_CHARGE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Flat tax rate applied to the subtotal (0.18).
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

// =============================================================================
// OrderSummary
// =============================================================================

/// Price breakdown for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub subtotal: Price,
    pub delivery_charge: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderSummary {
    /// Compute delivery, tax and total for a subtotal.
    #[must_use]
    pub fn for_subtotal(subtotal: Price) -> Self {
        let delivery_charge = if subtotal.amount() > FREE_DELIVERY_THRESHOLD {
            Price::ZERO
        } else {
            Price::new(DELIVERY_CHARGE).unwrap_or_default()
        };
        let tax = subtotal.scaled(TAX_RATE);

        Self {
            subtotal,
            delivery_charge,
            tax,
            total: subtotal + delivery_charge + tax,
        }
    }

    /// Breakdown for the current contents of a cart.
    #[must_use]
    pub fn for_cart(cart: &CartState) -> Self {
        Self::for_subtotal(cart.grand_total())
    }
}

// =============================================================================
// ShippingAddress
// =============================================================================

/// Where an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ShippingAddress {
    /// Check that every required field has some non-blank text.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Validation`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CartError> {
        let required = [
            ("full name", &self.full_name),
            ("address line 1", &self.line1),
            ("city", &self.city),
            ("postal code", &self.postal_code),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CartError::Validation(format!(
                    "shipping address {field} is required"
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Order request / confirmation
// =============================================================================

/// One line of an order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
}

/// Payload sent to the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    #[serde(flatten)]
    pub summary: OrderSummary,
}

impl OrderRequest {
    /// Build the payload for a cart and address.
    #[must_use]
    pub fn new(cart: &CartState, shipping_address: ShippingAddress) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|l| OrderItem {
                    product_id: l.product_id(),
                    quantity: l.quantity(),
                    unit_price: l.unit_price(),
                })
                .collect(),
            shipping_address,
            summary: OrderSummary::for_cart(cart),
        }
    }
}

/// What the order service returns on acceptance.
///
/// The identifier is read from `orderId`, falling back to `order.id`.
/// Services that report neither still accepted the order, so it is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ConfirmationBody")]
pub struct OrderConfirmation {
    pub order_id: Option<OrderId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationBody {
    #[serde(default)]
    order_id: Option<OrderId>,
    #[serde(default)]
    order: Option<PlacedOrder>,
}

#[derive(Deserialize)]
struct PlacedOrder {
    #[serde(default)]
    id: Option<OrderId>,
}

impl From<ConfirmationBody> for OrderConfirmation {
    fn from(body: ConfirmationBody) -> Self {
        Self {
            order_id: body.order_id.or_else(|| body.order.and_then(|o| o.id)),
        }
    }
}

/// An order service that accepts or declines an order.
///
/// Implementations decide what counts as a rejection (for HTTP: 4xx) versus a
/// transport failure.
pub trait OrderSubmitter {
    /// Submit an order.
    fn submit(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, SubmitError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Asha Rao".to_string(),
            line1: "12 Park Street".to_string(),
            line2: None,
            city: "Pune".to_string(),
            postal_code: "411001".to_string(),
            country: "IN".to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_summary_below_threshold() {
        let summary = OrderSummary::for_subtotal(Price::from_units(900));
        assert_eq!(summary.delivery_charge.amount(), Decimal::from(50));
        assert_eq!(summary.tax.amount(), Decimal::new(16200, 2));
        assert_eq!(summary.total.amount(), Decimal::new(111_200, 2));
        assert_eq!(summary.total.to_string(), "1112.00");
    }

    #[test]
    fn test_summary_above_threshold() {
        let summary = OrderSummary::for_subtotal(Price::from_units(1500));
        assert!(summary.delivery_charge.is_zero());
        assert_eq!(summary.tax.amount(), Decimal::from(270));
        assert_eq!(summary.total.amount(), Decimal::from(1770));
    }

    #[test]
    fn test_summary_at_threshold_still_pays_delivery() {
        let summary = OrderSummary::for_subtotal(Price::from_units(1000));
        assert_eq!(summary.delivery_charge.amount(), Decimal::from(50));
        assert_eq!(summary.total.amount(), Decimal::from(1230));
    }

    #[test]
    fn test_address_validation() {
        assert!(address().validate().is_ok());

        let mut blank_city = address();
        blank_city.city = "  ".to_string();
        let err = blank_city.validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: shipping address city is required");
    }

    #[test]
    fn test_order_request_payload() {
        let mut cart = CartState::new();
        cart.add_item(ProductId::new(4), "Classic White T-Shirt", Decimal::from(499), None)
            .unwrap();
        cart.add_item(ProductId::new(4), "Classic White T-Shirt", Decimal::from(499), None)
            .unwrap();

        let request = OrderRequest::new(&cart, address());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["items"][0]["productId"], 4);
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["items"][0]["unitPrice"], "499");
        assert_eq!(json["subtotal"], "998");
        assert_eq!(json["deliveryCharge"], "50");
        assert_eq!(json["shippingAddress"]["postalCode"], "411001");
    }

    #[test]
    fn test_confirmation_reads_either_id_shape() {
        let flat: OrderConfirmation = serde_json::from_str(r#"{"orderId": 5}"#).unwrap();
        assert_eq!(flat.order_id, Some(OrderId::new(5)));

        let nested: OrderConfirmation =
            serde_json::from_str(r#"{"order": {"id": 6, "total": "10"}}"#).unwrap();
        assert_eq!(nested.order_id, Some(OrderId::new(6)));

        let bare: OrderConfirmation =
            serde_json::from_str(r#"{"message": "Order placed"}"#).unwrap();
        assert_eq!(bare.order_id, None);
    }
}
