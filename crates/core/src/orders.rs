//! Past orders as listed by the order service.
//!
//! Field names are read in camelCase or snake_case (`createdAt` or
//! `created_at`, `productId` or `product_id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, Price, ProductId, lenient};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: OrderId,
    pub total: Price,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderRecordItem>,
}

impl OrderRecord {
    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// One line of a placed order, priced at the time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecordItem {
    #[serde(alias = "product_id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient::quantity")]
    pub quantity: u32,
    pub price: Price,
}

impl OrderRecordItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_order_record_from_backend_json() {
        let json = r#"{
            "id": 31,
            "total": "1112.00",
            "createdAt": "2026-03-14T09:30:00Z",
            "items": [
                {"productId": 4, "name": "Classic White T-Shirt", "quantity": "2", "price": 450}
            ]
        }"#;
        let order: OrderRecord = serde_json::from_str(json).unwrap();

        assert_eq!(order.id, OrderId::new(31));
        assert_eq!(order.total.amount(), Decimal::new(111_200, 2));
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.items[0].line_total(), Price::from_units(900));
        assert_eq!(order.created_at.to_rfc3339(), "2026-03-14T09:30:00+00:00");
    }

    #[test]
    fn test_order_record_snake_case_fields() {
        let json = r#"{
            "orders": [{
                "id": 8,
                "user_id": 1,
                "total": 1473.82,
                "created_at": "2026-05-02T18:45:10.000Z",
                "items": [
                    {"id": 20, "order_id": 8, "product_id": 6, "quantity": 3, "price": "250.00", "name": "Canvas Tote", "image": "👜"},
                    {"id": 21, "order_id": 8, "product_id": 4, "quantity": 1, "price": 499, "name": "Classic White T-Shirt", "image": null}
                ]
            }]
        }"#;
        let body: serde_json::Value = serde_json::from_str(json).unwrap();
        let order: OrderRecord = serde_json::from_value(body["orders"][0].clone()).unwrap();

        assert_eq!(order.id, OrderId::new(8));
        assert_eq!(order.total.amount(), Decimal::new(147_382, 2));
        assert_eq!(order.created_at.to_rfc3339(), "2026-05-02T18:45:10+00:00");
        assert_eq!(order.items[0].product_id, ProductId::new(6));
        assert_eq!(order.items[1].image, None);
        assert_eq!(order.item_count(), 4);
    }

    #[test]
    fn test_order_record_without_items() {
        let json = r#"{"id": 1, "total": 0, "createdAt": "2026-01-01T00:00:00Z"}"#;
        let order: OrderRecord = serde_json::from_str(json).unwrap();
        assert!(order.items.is_empty());
        assert_eq!(order.item_count(), 0);
    }
}
