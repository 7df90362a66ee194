//! Cart commands.
//!
//! Each invocation hydrates a server-authoritative store, applies at most one
//! mutation, and prints the resulting cart.

use tote_client::ApiClient;
use tote_core::{CartStore, ProductId};

use super::{CommandError, client, print_cart};

/// A single cart mutation.
#[derive(Debug, Clone, Copy)]
pub enum CartAction {
    Show,
    Add(ProductId),
    Set(ProductId, i64),
    Remove(ProductId),
    Increment(ProductId),
    Decrement(ProductId),
}

/// Run a cart action against the remote cart.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the product is unknown or not
/// in the cart, or the backend cannot be reached.
pub async fn run(action: CartAction) -> Result<(), CommandError> {
    let client = client()?;
    let mut store = CartStore::with_sync(client.clone());
    store.hydrate().await?;

    apply(&client, &mut store, action).await?;

    print_cart(store.state());
    Ok(())
}

async fn apply(
    client: &ApiClient,
    store: &mut CartStore<ApiClient>,
    action: CartAction,
) -> Result<(), CommandError> {
    match action {
        CartAction::Show => {}
        CartAction::Add(id) => {
            let product = client.get_product(id).await?;
            store.add_product(&product).await?;
        }
        CartAction::Set(id, quantity) => {
            store.set_quantity(id, quantity).await?;
        }
        CartAction::Remove(id) => {
            store.remove_item(id).await?;
        }
        CartAction::Increment(id) => {
            store.increment(id).await?;
        }
        CartAction::Decrement(id) => {
            store.decrement(id).await?;
        }
    }
    Ok(())
}
