//! The cart store: one [`CartState`] plus an optional remote cart.
//!
//! # Lifecycle
//!
//! A store is created when a session starts ([`CartStore::new`] for a
//! client-local cart, [`CartStore::with_sync`] for a server-authoritative
//! one), passed by reference to whatever needs the cart, and dropped when the
//! session ends. There is no global instance.
//!
//! # Synchronization
//!
//! With a remote cart, every effective mutation is applied locally, pushed,
//! and followed by a full re-fetch that replaces local state (last fetch
//! wins). A failed push or fetch is returned as [`CartError::Sync`] and the
//! local mutation stays in place. Mutating methods take `&mut self`, so calls
//! through one store never overlap.

use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::cart::{CartChange, CartState, Totals};
use crate::catalog::Product;
use crate::checkout::{OrderConfirmation, OrderRequest, OrderSubmitter, ShippingAddress};
use crate::error::CartError;
use crate::sync::{CartSync, Detached};
use crate::types::ProductId;

/// Owns a session's cart and controls every mutation of it.
#[derive(Debug)]
pub struct CartStore<S = Detached> {
    state: CartState,
    sync: Option<S>,
}

impl CartStore<Detached> {
    /// A client-local store with an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CartState::new(),
            sync: None,
        }
    }
}

impl Default for CartStore<Detached> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CartSync> CartStore<S> {
    /// A store backed by a remote cart. Call [`CartStore::hydrate`] to load it.
    #[must_use]
    pub const fn with_sync(sync: S) -> Self {
        Self {
            state: CartState::new(),
            sync: Some(sync),
        }
    }

    /// Current cart state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// The remote cart adapter, if any.
    #[must_use]
    pub const fn sync(&self) -> Option<&S> {
        self.sync.as_ref()
    }

    /// Per-line totals and grand total. No side effects.
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.state.totals()
    }

    /// End the session, keeping the final cart state.
    #[must_use]
    pub fn into_state(self) -> CartState {
        self.state
    }

    /// Replace local state with the remote cart.
    ///
    /// A no-op for stores without a remote cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Sync`] if the fetch fails or the payload is
    /// invalid; local state is unchanged in that case.
    #[instrument(skip(self))]
    pub async fn hydrate(&mut self) -> Result<&CartState, CartError> {
        if let Some(sync) = self.sync.as_ref() {
            let remote = sync.fetch().await?;
            let state = CartState::from_remote(remote)?;
            debug!(lines = state.lines().len(), "Cart hydrated from remote");
            self.state = state;
        }
        Ok(&self.state)
    }

    /// Add one unit of a product. See [`CartState::add_item`].
    ///
    /// # Errors
    ///
    /// [`CartError::Validation`] for a negative price (nothing changes), or
    /// [`CartError::Sync`] if the remote update fails (the local add is kept).
    #[instrument(skip(self, name, image), fields(product_id = %product_id))]
    pub async fn add_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Decimal,
        image: Option<String>,
    ) -> Result<&CartState, CartError> {
        let change = self.state.add_item(product_id, name, unit_price, image)?;
        self.propagate(Some(change)).await
    }

    /// Add one unit of a catalog product.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_item`].
    pub async fn add_product(&mut self, product: &Product) -> Result<&CartState, CartError> {
        self.add_item(
            product.id,
            product.name.clone(),
            product.price.amount(),
            product.image.clone(),
        )
        .await
    }

    /// Remove a product's line; absent products are a no-op.
    ///
    /// # Errors
    ///
    /// [`CartError::Sync`] if the remote update fails (the local removal is kept).
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&mut self, product_id: ProductId) -> Result<&CartState, CartError> {
        let change = self.state.remove_item(product_id);
        self.propagate(change).await
    }

    /// Set a line's quantity; zero or less removes it.
    ///
    /// # Errors
    ///
    /// [`CartError::NotFound`] when setting a positive quantity on a product
    /// with no line, [`CartError::Validation`] for an out-of-range quantity, or
    /// [`CartError::Sync`] if the remote update fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<&CartState, CartError> {
        let change = self.state.set_quantity(product_id, quantity)?;
        self.propagate(change).await
    }

    /// Increase a line's quantity by one.
    ///
    /// # Errors
    ///
    /// [`CartError::NotFound`] if the product has no line, or
    /// [`CartError::Sync`] if the remote update fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn increment(&mut self, product_id: ProductId) -> Result<&CartState, CartError> {
        let change = self.state.increment(product_id)?;
        self.propagate(Some(change)).await
    }

    /// Decrease a line's quantity by one, never below 1.
    ///
    /// # Errors
    ///
    /// [`CartError::NotFound`] if the product has no line, or
    /// [`CartError::Sync`] if the remote update fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn decrement(&mut self, product_id: ProductId) -> Result<&CartState, CartError> {
        let change = self.state.decrement(product_id)?;
        self.propagate(change).await
    }

    /// Empty the cart locally.
    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Submit the cart as an order and clear it on success.
    ///
    /// With a remote cart, the store re-fetches it after the order is
    /// accepted and the remote contents win. A backend that empties its cart
    /// on order leaves the store empty; one that does not will see the
    /// ordered lines again. A failed re-fetch is logged and leaves the local
    /// cart empty; the order is still reported as placed.
    ///
    /// # Errors
    ///
    /// - [`CartError::OrderRejected`] if the cart is empty (the submitter is
    ///   not called) or the submitter declines the order.
    /// - [`CartError::Validation`] if the address is incomplete.
    /// - [`CartError::Sync`] if the submitter cannot be reached.
    ///
    /// The cart is untouched on every error.
    #[instrument(skip(self, submitter, shipping_address))]
    pub async fn place_order<O: OrderSubmitter>(
        &mut self,
        submitter: &O,
        shipping_address: ShippingAddress,
    ) -> Result<OrderConfirmation, CartError> {
        if self.state.is_empty() {
            return Err(CartError::OrderRejected("cart is empty".to_string()));
        }
        shipping_address.validate()?;

        let request = OrderRequest::new(&self.state, shipping_address);
        let confirmation = submitter.submit(&request).await?;

        info!(
            order_id = ?confirmation.order_id,
            total = %request.summary.total,
            "Order placed"
        );
        self.clear();
        self.refresh_after_order().await;
        Ok(confirmation)
    }

    async fn refresh_after_order(&mut self) {
        let Some(sync) = self.sync.as_ref() else {
            return;
        };
        let remote = match sync.fetch().await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(error = %e, "Could not refresh remote cart after order");
                return;
            }
        };
        match CartState::from_remote(remote) {
            Ok(state) => {
                if !state.is_empty() {
                    warn!(lines = state.lines().len(), "Remote cart still holds lines after order");
                }
                self.state = state;
            }
            Err(e) => warn!(error = %e, "Could not decode remote cart after order"),
        }
    }

    async fn propagate(&mut self, change: Option<CartChange>) -> Result<&CartState, CartError> {
        let (Some(sync), Some(change)) = (self.sync.as_ref(), change) else {
            return Ok(&self.state);
        };

        debug!(?change, "Pushing cart change");
        sync.push(&change).await?;

        let remote = sync.fetch().await?;
        self.state = CartState::from_remote(remote)?;
        Ok(&self.state)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::checkout::OrderSummary;
    use crate::error::{SubmitError, SyncError};
    use crate::sync::RemoteCartLine;
    use crate::types::{CartLineId, OrderId, Price};

    /// In-memory remote cart that applies pushes the way the backend does.
    #[derive(Default)]
    struct FakeRemote {
        lines: Mutex<Vec<RemoteCartLine>>,
        pushes: Mutex<Vec<CartChange>>,
        fail_push: bool,
        fail_fetch: bool,
    }

    impl FakeRemote {
        fn seeded(lines: Vec<RemoteCartLine>) -> Self {
            Self {
                lines: Mutex::new(lines),
                ..Self::default()
            }
        }

        fn push_count(&self) -> usize {
            self.pushes.lock().unwrap().len()
        }
    }

    impl CartSync for FakeRemote {
        async fn fetch(&self) -> Result<Vec<RemoteCartLine>, SyncError> {
            if self.fail_fetch {
                return Err(SyncError::Transport("connection refused".to_string()));
            }
            Ok(self.lines.lock().unwrap().clone())
        }

        async fn push(&self, change: &CartChange) -> Result<(), SyncError> {
            self.pushes.lock().unwrap().push(change.clone());
            if self.fail_push {
                return Err(SyncError::Status {
                    status: 500,
                    message: "boom".to_string(),
                });
            }

            let mut lines = self.lines.lock().unwrap();
            match change {
                CartChange::Added { product_id, .. } => {
                    if let Some(line) = lines.iter_mut().find(|l| l.product_id == *product_id) {
                        line.quantity += 1;
                    } else {
                        let next_id = i64::try_from(lines.len()).unwrap() + 1;
                        lines.push(remote_line(next_id, product_id.get(), 100, 1));
                    }
                }
                CartChange::QuantitySet {
                    product_id,
                    quantity,
                    ..
                } => {
                    if let Some(line) = lines.iter_mut().find(|l| l.product_id == *product_id) {
                        line.quantity = *quantity;
                    }
                }
                CartChange::Removed { product_id, .. } => {
                    lines.retain(|l| l.product_id != *product_id);
                }
            }
            Ok(())
        }
    }

    struct FakeOrders {
        result: fn() -> Result<OrderConfirmation, SubmitError>,
        seen: Mutex<Vec<OrderRequest>>,
    }

    impl FakeOrders {
        fn new(result: fn() -> Result<OrderConfirmation, SubmitError>) -> Self {
            Self {
                result,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl OrderSubmitter for FakeOrders {
        async fn submit(&self, order: &OrderRequest) -> Result<OrderConfirmation, SubmitError> {
            self.seen.lock().unwrap().push(order.clone());
            (self.result)()
        }
    }

    fn accepted() -> Result<OrderConfirmation, SubmitError> {
        Ok(OrderConfirmation {
            order_id: Some(OrderId::new(77)),
        })
    }

    fn declined() -> Result<OrderConfirmation, SubmitError> {
        Err(SubmitError::Rejected("not signed in".to_string()))
    }

    fn unreachable() -> Result<OrderConfirmation, SubmitError> {
        Err(SubmitError::Sync(SyncError::Transport("timeout".to_string())))
    }

    fn remote_line(id: i64, product: i64, price: i64, quantity: u32) -> RemoteCartLine {
        RemoteCartLine {
            remote_id: Some(CartLineId::new(id)),
            product_id: ProductId::new(product),
            name: format!("Remote {product}"),
            image: None,
            unit_price: Decimal::from(price),
            quantity,
        }
    }

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

    fn pid(id: i64) -> ProductId {
        ProductId::new(id)
    }

    #[tokio::test]
    async fn test_local_store_scenario() {
        let mut store = CartStore::new();
        store
            .add_item(pid(4), "Classic White T-Shirt", Decimal::from(499), None)
            .await
            .unwrap();
        let state = store
            .add_item(pid(4), "Classic White T-Shirt", Decimal::from(499), None)
            .await
            .unwrap();

        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.lines()[0].quantity(), 2);
        assert_eq!(store.totals().grand_total.amount(), Decimal::from(998));
    }

    #[tokio::test]
    async fn test_local_hydrate_is_noop() {
        let mut store = CartStore::new();
        store.add_item(pid(1), "A", Decimal::ONE, None).await.unwrap();
        let state = store.hydrate().await.unwrap();
        assert_eq!(state.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_set_quantity_missing_line_leaves_state() {
        let mut store = CartStore::new();
        let err = store.set_quantity(pid(99), 3).await.unwrap_err();
        assert!(matches!(err, CartError::NotFound(id) if id == pid(99)));
        assert!(store.state().is_empty());
    }

    #[tokio::test]
    async fn test_add_product_copies_catalog_fields() {
        let product = Product {
            id: pid(4),
            name: "Classic White T-Shirt".to_string(),
            price: Price::from_units(499),
            description: "Soft cotton".to_string(),
            image: Some("👕".to_string()),
        };
        let mut store = CartStore::new();
        store.add_product(&product).await.unwrap();

        let line = store.state().line(pid(4)).unwrap();
        assert_eq!(line.name(), "Classic White T-Shirt");
        assert_eq!(line.image(), Some("👕"));
        assert_eq!(line.unit_price(), Price::from_units(499));
    }

    #[tokio::test]
    async fn test_hydrate_replaces_local_state() {
        let remote = FakeRemote::seeded(vec![remote_line(2, 5, 250, 2), remote_line(1, 4, 499, 1)]);
        let mut store = CartStore::with_sync(remote);

        let state = store.hydrate().await.unwrap();
        assert_eq!(state.lines().len(), 2);
        assert_eq!(state.lines()[0].product_id(), pid(4));
        assert_eq!(store.totals().grand_total.amount(), Decimal::from(999));
    }

    #[tokio::test]
    async fn test_hydrate_failure_keeps_state() {
        let remote = FakeRemote {
            fail_fetch: true,
            ..FakeRemote::default()
        };
        let mut store = CartStore::with_sync(remote);
        let err = store.hydrate().await.unwrap_err();
        assert!(matches!(err, CartError::Sync(SyncError::Transport(_))));
        assert!(store.state().is_empty());
    }

    #[tokio::test]
    async fn test_mutation_pushes_then_rehydrates() {
        let remote = FakeRemote::seeded(vec![remote_line(1, 4, 499, 1)]);
        let mut store = CartStore::with_sync(remote);
        store.hydrate().await.unwrap();

        store.increment(pid(4)).await.unwrap();
        let line = store.state().line(pid(4)).unwrap();
        assert_eq!(line.quantity(), 2);
        assert_eq!(line.remote_id(), Some(CartLineId::new(1)));

        let pushes = store.sync().unwrap().pushes.lock().unwrap().clone();
        assert_eq!(
            pushes,
            vec![CartChange::QuantitySet {
                product_id: pid(4),
                remote_id: Some(CartLineId::new(1)),
                quantity: 2,
            }]
        );
    }

    #[tokio::test]
    async fn test_remote_is_authoritative_after_push() {
        // The fake backend prices new products at 100 regardless of what we sent.
        let mut store = CartStore::with_sync(FakeRemote::default());
        store.add_item(pid(9), "Mug", Decimal::from(350), None).await.unwrap();

        let line = store.state().line(pid(9)).unwrap();
        assert_eq!(line.unit_price(), Price::from_units(100));
        assert_eq!(line.name(), "Remote 9");
    }

    #[tokio::test]
    async fn test_noop_mutations_do_not_push() {
        let remote = FakeRemote::seeded(vec![remote_line(1, 4, 499, 1)]);
        let mut store = CartStore::with_sync(remote);
        store.hydrate().await.unwrap();

        store.decrement(pid(4)).await.unwrap();
        store.remove_item(pid(42)).await.unwrap();
        store.set_quantity(pid(4), 1).await.unwrap();

        assert_eq!(store.sync().unwrap().push_count(), 0);
        assert_eq!(store.state().line(pid(4)).unwrap().quantity(), 1);
    }

    #[tokio::test]
    async fn test_failed_push_keeps_local_mutation() {
        let remote = FakeRemote {
            fail_push: true,
            ..FakeRemote::seeded(vec![remote_line(1, 4, 499, 1)])
        };
        let mut store = CartStore::with_sync(remote);
        store.hydrate().await.unwrap();

        let err = store.set_quantity(pid(4), 5).await.unwrap_err();
        assert!(matches!(err, CartError::Sync(SyncError::Status { status: 500, .. })));
        assert_eq!(store.state().line(pid(4)).unwrap().quantity(), 5);
    }

    #[tokio::test]
    async fn test_validation_error_does_not_push() {
        let mut store = CartStore::with_sync(FakeRemote::default());
        let err = store
            .add_item(pid(1), "Bad", Decimal::from(-5), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Validation(_)));
        assert_eq!(store.sync().unwrap().push_count(), 0);
    }

    #[tokio::test]
    async fn test_place_order_clears_cart() {
        let mut store = CartStore::new();
        store.add_item(pid(4), "Shirt", Decimal::from(450), None).await.unwrap();
        store.add_item(pid(4), "Shirt", Decimal::from(450), None).await.unwrap();

        let orders = FakeOrders::new(accepted);
        let confirmation = store.place_order(&orders, address()).await.unwrap();

        assert_eq!(confirmation.order_id, Some(OrderId::new(77)));
        assert!(store.state().is_empty());

        let seen = orders.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].summary, OrderSummary::for_subtotal(Price::from_units(900)));
        assert_eq!(seen[0].summary.total.amount(), Decimal::from(1112));
    }

    #[tokio::test]
    async fn test_place_order_refreshes_remote_cart() {
        let mut store = CartStore::with_sync(FakeRemote::seeded(vec![remote_line(1, 4, 499, 2)]));
        store.hydrate().await.unwrap();

        // This remote keeps its lines after an order, and the store shows them.
        store.place_order(&FakeOrders::new(accepted), address()).await.unwrap();
        assert_eq!(store.state().line(pid(4)).unwrap().quantity(), 2);

        store.sync().unwrap().lines.lock().unwrap().clear();
        store.place_order(&FakeOrders::new(accepted), address()).await.unwrap();
        assert!(store.state().is_empty());
    }

    #[tokio::test]
    async fn test_place_order_succeeds_when_refresh_fails() {
        let mut store = CartStore::with_sync(FakeRemote {
            fail_fetch: true,
            ..FakeRemote::default()
        });
        store.add_item(pid(1), "A", Decimal::from(10), None).await.unwrap_err();
        assert_eq!(store.state().lines().len(), 1);

        let confirmation = store
            .place_order(&FakeOrders::new(accepted), address())
            .await
            .unwrap();
        assert_eq!(confirmation.order_id, Some(OrderId::new(77)));
        assert!(store.state().is_empty());
    }

    #[test]
    fn test_default_store_is_detached_and_empty() {
        let store = CartStore::default();
        assert!(store.state().is_empty());
        assert!(store.sync().is_none());
    }

    #[tokio::test]
    async fn test_place_order_empty_cart_is_rejected() {
        let mut store = CartStore::new();
        let orders = FakeOrders::new(accepted);

        let err = store.place_order(&orders, address()).await.unwrap_err();
        assert!(matches!(err, CartError::OrderRejected(_)));
        assert!(orders.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_place_order_failure_keeps_cart() {
        let mut store = CartStore::new();
        store.add_item(pid(1), "A", Decimal::from(10), None).await.unwrap();

        let err = store
            .place_order(&FakeOrders::new(declined), address())
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::OrderRejected(ref r) if r == "not signed in"));
        assert_eq!(store.state().lines().len(), 1);

        let err = store
            .place_order(&FakeOrders::new(unreachable), address())
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Sync(_)));
        assert_eq!(store.state().lines().len(), 1);
    }

    #[tokio::test]
    async fn test_place_order_validates_address() {
        let mut store = CartStore::new();
        store.add_item(pid(1), "A", Decimal::from(10), None).await.unwrap();
        let orders = FakeOrders::new(accepted);

        let mut address = address();
        address.full_name = String::new();
        let err = store.place_order(&orders, address).await.unwrap_err();

        assert!(matches!(err, CartError::Validation(_)));
        assert!(orders.seen.lock().unwrap().is_empty());
        assert_eq!(store.state().lines().len(), 1);
    }
}
