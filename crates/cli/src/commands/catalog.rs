//! Catalog browsing commands.

use tote_core::{Product, ProductId};

use super::{CommandError, client};

/// List all products.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the request fails.
pub async fn list() -> Result<(), CommandError> {
    let products = client()?.list_products().await?;
    print_products(&products);
    Ok(())
}

/// Show one product in detail.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the product does not exist,
/// or the request fails.
pub async fn show(id: ProductId) -> Result<(), CommandError> {
    let product = client()?.get_product(id).await?;
    print_product(&product);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products available.");
        return;
    }
    for product in products {
        println!(
            "{:>6}  {} {:<32} {:>10}",
            product.id.to_string(),
            product.image.as_deref().unwrap_or(" "),
            product.name,
            product.price.to_string(),
        );
    }
}

#[allow(clippy::print_stdout)]
fn print_product(product: &Product) {
    println!("{} {}", product.image.as_deref().unwrap_or(""), product.name);
    println!("Price: {}", product.price);
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}
