//! Cart state and its local mutations.
//!
//! [`CartState`] is a plain value: an ordered list of [`CartLine`]s, unique by
//! product, each with a quantity of at least one. All totals are computed
//! from the lines on demand; nothing derived is stored.
//!
//! Mutations here never touch the network. They report what changed as a
//! [`CartChange`] so that [`crate::CartStore`] can forward it to a remote cart.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::catalog::Product;
use crate::error::{CartError, SyncError};
use crate::sync::RemoteCartLine;
use crate::types::{CartLineId, Price, ProductId};

// =============================================================================
// CartLine
// =============================================================================

/// One product's presence in the cart.
///
/// `name`, `image` and `unit_price` are copied when the line is created and
/// are not refreshed from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    product_id: ProductId,
    name: String,
    image: Option<String>,
    unit_price: Price,
    quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_id: Option<CartLineId>,
}

impl CartLine {
    /// Catalog product this line refers to.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Display name captured at add time.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display image captured at add time.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Unit price captured at add time.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Quantity, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The backend's id for this line, if it came from a hydrate.
    #[must_use]
    pub const fn remote_id(&self) -> Option<CartLineId> {
        self.remote_id
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

// =============================================================================
// CartChange
// =============================================================================

/// A single effective change to the cart, as forwarded to a remote cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// One unit of a product was added (new line or existing line + 1).
    Added {
        /// The product added.
        product_id: ProductId,
        /// Quantity of the line after the add.
        quantity: u32,
    },
    /// A line's quantity was set to a new absolute value.
    QuantitySet {
        /// The product whose line changed.
        product_id: ProductId,
        /// Backend line id, when known.
        remote_id: Option<CartLineId>,
        /// The new quantity.
        quantity: u32,
    },
    /// A line was removed.
    Removed {
        /// The product whose line was removed.
        product_id: ProductId,
        /// Backend line id, when known.
        remote_id: Option<CartLineId>,
    },
}

impl CartChange {
    /// The product this change is about.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::Added { product_id, .. }
            | Self::QuantitySet { product_id, .. }
            | Self::Removed { product_id, .. } => *product_id,
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Total for a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTotal {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Per-line totals and the grand total (excluding tax and delivery).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub lines: Vec<LineTotal>,
    pub grand_total: Price,
}

// =============================================================================
// CartState
// =============================================================================

/// The cart aggregate: ordered lines, unique by product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion (or remote) order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Returns true if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn grand_total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Per-line totals and the grand total.
    #[must_use]
    pub fn totals(&self) -> Totals {
        let lines: Vec<LineTotal> = self
            .lines
            .iter()
            .map(|l| LineTotal {
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price,
                line_total: l.line_total(),
            })
            .collect();
        let grand_total = lines.iter().map(|l| l.line_total).sum();
        Totals { lines, grand_total }
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing line, or appends a new line with quantity 1.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Validation`] if `unit_price` is negative.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Decimal,
        image: Option<String>,
    ) -> Result<CartChange, CartError> {
        let unit_price = Price::new(unit_price)?;

        let quantity = if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = bump(line.quantity, product_id)?;
            line.quantity
        } else {
            self.lines.push(CartLine {
                product_id,
                name: name.into(),
                image,
                unit_price,
                quantity: 1,
                remote_id: None,
            });
            1
        };

        Ok(CartChange::Added {
            product_id,
            quantity,
        })
    }

    /// Add one unit of a catalog product, copying its name, price and image.
    ///
    /// # Errors
    ///
    /// See [`CartState::add_item`].
    pub fn add_product(&mut self, product: &Product) -> Result<CartChange, CartError> {
        self.add_item(
            product.id,
            product.name.clone(),
            product.price.amount(),
            product.image.clone(),
        )
    }

    /// Remove a product's line. Absent products are a no-op (`None`).
    pub fn remove_item(&mut self, product_id: ProductId) -> Option<CartChange> {
        let index = self.position(product_id)?;
        let line = self.lines.remove(index);
        Some(CartChange::Removed {
            product_id,
            remote_id: line.remote_id,
        })
    }

    /// Set a line's quantity to an absolute value.
    ///
    /// A quantity of zero or less removes the line. This never creates a
    /// line; use [`CartState::add_item`] for that.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if `quantity > 0` and the product has
    /// no line, and [`CartError::Validation`] if `quantity` does not fit a `u32`.
    pub fn set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Option<CartChange>, CartError> {
        if quantity <= 0 {
            return Ok(self.remove_item(product_id));
        }

        let quantity = u32::try_from(quantity)
            .map_err(|_| CartError::Validation(format!("quantity {quantity} is too large")))?;
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CartError::NotFound(product_id))?;

        if line.quantity == quantity {
            return Ok(None);
        }
        line.quantity = quantity;

        Ok(Some(CartChange::QuantitySet {
            product_id,
            remote_id: line.remote_id,
            quantity,
        }))
    }

    /// Increase a line's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the product has no line.
    pub fn increment(&mut self, product_id: ProductId) -> Result<CartChange, CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CartError::NotFound(product_id))?;
        line.quantity = bump(line.quantity, product_id)?;

        Ok(CartChange::QuantitySet {
            product_id,
            remote_id: line.remote_id,
            quantity: line.quantity,
        })
    }

    /// Decrease a line's quantity by one, never below 1.
    ///
    /// A line at quantity 1 is left alone (`None`); only
    /// [`CartState::remove_item`] takes a line out of the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if the product has no line.
    pub fn decrement(&mut self, product_id: ProductId) -> Result<Option<CartChange>, CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CartError::NotFound(product_id))?;

        if line.quantity <= 1 {
            return Ok(None);
        }
        line.quantity -= 1;

        Ok(Some(CartChange::QuantitySet {
            product_id,
            remote_id: line.remote_id,
            quantity: line.quantity,
        }))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Build a cart from a remote cart payload.
    ///
    /// Lines are ordered by backend line id (lines without one keep their
    /// relative order at the end). Lines with quantity 0 are dropped and
    /// repeated products are folded into one line.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Decode`] if a kept line has a negative or
    /// out-of-range price, or the folded quantity overflows.
    pub fn from_remote(mut remote: Vec<RemoteCartLine>) -> Result<Self, SyncError> {
        remote.sort_by_key(|r| (r.remote_id.is_none(), r.remote_id));

        let mut state = Self::new();
        for r in remote {
            if r.quantity == 0 {
                warn!(product_id = %r.product_id, "Skipping remote cart line with quantity 0");
                continue;
            }

            let unit_price = Price::new(r.unit_price).map_err(|e| {
                SyncError::Decode(format!("product {}: {e}", r.product_id))
            })?;

            if let Some(line) = state.lines.iter_mut().find(|l| l.product_id == r.product_id) {
                warn!(product_id = %r.product_id, "Folding duplicate remote cart line");
                line.quantity = line.quantity.checked_add(r.quantity).ok_or_else(|| {
                    SyncError::Decode(format!("product {}: quantity overflow", r.product_id))
                })?;
                continue;
            }

            state.lines.push(CartLine {
                product_id: r.product_id,
                name: r.name,
                image: r.image,
                unit_price,
                quantity: r.quantity,
                remote_id: r.remote_id,
            });
        }

        Ok(state)
    }
}

fn bump(quantity: u32, product_id: ProductId) -> Result<u32, CartError> {
    quantity
        .checked_add(1)
        .ok_or_else(|| CartError::Validation(format!("quantity for product {product_id} overflows")))
}
