//! Catalog product as served by the backend.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A product in the catalog.
///
/// Only `id`, `name`, `price` and `image` are copied into a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current unit price (may arrive as text).
    pub price: Price,
    /// Plain text description.
    #[serde(default)]
    pub description: String,
    /// Image URL or glyph.
    #[serde(default)]
    pub image: Option<String>,
}
