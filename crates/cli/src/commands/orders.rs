//! Order history command.

use tote_core::OrderRecord;

use super::{CommandError, client};

/// List the signed-in user's orders.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the token is missing or
/// rejected, or the request fails.
pub async fn list() -> Result<(), CommandError> {
    let orders = client()?.list_orders().await?;
    print_orders(&orders);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_orders(orders: &[OrderRecord]) {
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }
    for order in orders {
        println!(
            "Order {} ({}) total {}",
            order.id,
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.total
        );
        for item in &order.items {
            println!(
                "    {} {} x {} = {}",
                item.image.as_deref().unwrap_or(" "),
                item.name,
                item.quantity,
                item.line_total()
            );
        }
    }
}
