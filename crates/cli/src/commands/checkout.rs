//! Checkout command.

use tote_core::{CartStore, OrderId, OrderSummary, ShippingAddress};

use super::{CommandError, client, print_cart};

/// Show the order summary for the remote cart and, when confirmed, place the
/// order.
///
/// # Errors
///
/// Returns [`CommandError::NotConfirmed`] if `confirm` is false, or an error
/// if the cart is empty, the address is incomplete, the user is not signed
/// in, or the backend cannot be reached.
pub async fn run(address: ShippingAddress, confirm: bool) -> Result<(), CommandError> {
    let client = client()?;
    let mut store = CartStore::with_sync(client.clone());
    store.hydrate().await?;

    print_cart(store.state());
    print_summary(&OrderSummary::for_cart(store.state()));

    if !confirm {
        return Err(CommandError::NotConfirmed);
    }

    let confirmation = store.place_order(&client, address).await?;
    print_confirmation(confirmation.order_id);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_summary(summary: &OrderSummary) {
    println!();
    println!("Subtotal: {:>10}", summary.subtotal.to_string());
    if summary.delivery_charge.is_zero() {
        println!("Delivery: {:>10}", "FREE");
    } else {
        println!("Delivery: {:>10}", summary.delivery_charge.to_string());
    }
    println!("Tax:      {:>10}", summary.tax.to_string());
    println!("Total:    {:>10}", summary.total.to_string());
}

#[allow(clippy::print_stdout)]
fn print_confirmation(order_id: Option<OrderId>) {
    println!();
    match order_id {
        Some(id) => println!("Order {id} placed."),
        None => println!("Order placed."),
    }
}
