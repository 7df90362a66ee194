//! Integration tests for a server-authoritative cart.
//!
//! Run with: cargo test -p tote-integration-tests

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use tote_core::{CartError, CartLineId, CartStore, Price, ProductId, SyncError};
use tote_integration_tests::{BackendState, CartRow, FakeBackend};

fn backend_with_cart(rows: Vec<CartRow>) -> BackendState {
    let next_cart_id = rows.iter().map(|r| r.cart_id).max().unwrap_or(99) + 1;
    BackendState {
        cart: rows,
        next_cart_id,
        ..BackendState::default()
    }
}

// ============================================================================
// Hydrate
// ============================================================================

#[tokio::test]
async fn test_hydrate_coerces_text_numbers_and_sorts_by_cart_id() {
    let backend = FakeBackend::start_with(backend_with_cart(vec![
        CartRow {
            cart_id: 101,
            product_id: 4,
            quantity: 2,
        },
        CartRow {
            cart_id: 102,
            product_id: 6,
            quantity: 1,
        },
    ]))
    .await;
    let mut store = CartStore::with_sync(backend.client(true));

    let state = store.hydrate().await.unwrap();

    // The backend lists newest first; the store keeps cartId order.
    let ids: Vec<_> = state.lines().iter().map(|l| l.product_id()).collect();
    assert_eq!(ids, vec![ProductId::new(4), ProductId::new(6)]);
    assert_eq!(state.lines()[0].quantity(), 2);
    assert_eq!(state.lines()[0].remote_id(), Some(CartLineId::new(101)));
    assert_eq!(state.lines()[0].unit_price(), Price::from_units(499));
    assert_eq!(state.lines()[0].image(), Some("👕"));
    assert_eq!(store.totals().grand_total.amount(), Decimal::from(1248));
}

#[tokio::test]
async fn test_hydrate_without_token_is_sync_error() {
    let backend = FakeBackend::start().await;
    let mut store = CartStore::with_sync(backend.client(false));

    let err = store.hydrate().await.unwrap_err();
    assert!(matches!(
        err,
        CartError::Sync(SyncError::Status { status: 401, .. })
    ));
    assert!(store.state().is_empty());
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_add_pushes_then_resyncs() {
    let backend = FakeBackend::start().await;
    let client = backend.client(true);
    let mut store = CartStore::with_sync(client.clone());
    store.hydrate().await.unwrap();

    let shirt = client.get_product(ProductId::new(4)).await.unwrap();
    store.add_product(&shirt).await.unwrap();
    let state = store.add_product(&shirt).await.unwrap();

    assert_eq!(state.lines().len(), 1);
    assert_eq!(state.lines()[0].quantity(), 2);
    assert_eq!(state.lines()[0].remote_id(), Some(CartLineId::new(100)));
    assert_eq!(
        backend.state().cart,
        vec![CartRow {
            cart_id: 100,
            product_id: 4,
            quantity: 2
        }]
    );

    let backend_state = backend.state();
    assert_eq!(backend_state.count("POST", "/api/cart/add"), 2);
    // One initial hydrate plus one re-fetch per add.
    assert_eq!(backend_state.count("GET", "/api/cart"), 3);
}

#[tokio::test]
async fn test_set_increment_decrement_remove_address_cart_line() {
    let backend = FakeBackend::start_with(backend_with_cart(vec![CartRow {
        cart_id: 230,
        product_id: 5,
        quantity: 1,
    }]))
    .await;
    let mut store = CartStore::with_sync(backend.client(true));
    store.hydrate().await.unwrap();
    let jacket = ProductId::new(5);

    store.set_quantity(jacket, 4).await.unwrap();
    store.increment(jacket).await.unwrap();
    let state = store.decrement(jacket).await.unwrap();
    assert_eq!(state.line(jacket).unwrap().quantity(), 4);
    assert_eq!(backend.state().cart[0].quantity, 4);
    assert_eq!(backend.state().count("PUT", "/api/cart/update/230"), 3);

    let state = store.set_quantity(jacket, 0).await.unwrap();
    assert!(state.is_empty());
    assert!(backend.state().cart.is_empty());
    assert_eq!(backend.state().count("DELETE", "/api/cart/remove/230"), 1);
}

#[tokio::test]
async fn test_decrement_at_one_does_not_call_backend() {
    let backend = FakeBackend::start_with(backend_with_cart(vec![CartRow {
        cart_id: 7,
        product_id: 6,
        quantity: 1,
    }]))
    .await;
    let mut store = CartStore::with_sync(backend.client(true));
    store.hydrate().await.unwrap();

    store.decrement(ProductId::new(6)).await.unwrap();
    store.remove_item(ProductId::new(99)).await.unwrap();

    let backend_state = backend.state();
    assert_eq!(backend_state.count("PUT", "/api/cart/update/7"), 0);
    assert_eq!(backend_state.count("DELETE", "/api/cart/remove/99"), 0);
    assert_eq!(backend_state.count("GET", "/api/cart"), 1);
}

#[tokio::test]
async fn test_failed_push_keeps_local_mutation() {
    let backend = FakeBackend::start_with(backend_with_cart(vec![CartRow {
        cart_id: 101,
        product_id: 4,
        quantity: 1,
    }]))
    .await;
    let mut store = CartStore::with_sync(backend.client(true));
    store.hydrate().await.unwrap();

    backend.state().fail_cart_writes = true;
    let err = store.increment(ProductId::new(4)).await.unwrap_err();

    match err {
        CartError::Sync(SyncError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "cart store unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.state().line(ProductId::new(4)).unwrap().quantity(), 2);
    assert_eq!(backend.state().cart[0].quantity, 1);

    // The next successful hydrate restores the backend's view.
    backend.state().fail_cart_writes = false;
    let state = store.hydrate().await.unwrap();
    assert_eq!(state.line(ProductId::new(4)).unwrap().quantity(), 1);
}

#[tokio::test]
async fn test_unknown_product_add_is_sync_error() {
    let backend = FakeBackend::start().await;
    let mut store = CartStore::with_sync(backend.client(true));

    let err = store
        .add_item(ProductId::new(404), "Ghost", Decimal::from(10), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CartError::Sync(SyncError::Status { status: 404, .. })
    ));
}
