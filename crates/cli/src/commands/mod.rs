//! Command implementations.
//!
//! Every command builds an [`ApiClient`] from the environment (see
//! [`tote_client::config`]) and prints its result to stdout.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use thiserror::Error;
use tote_client::{ApiClient, ApiConfig, ApiError, ConfigError};
use tote_core::{CartError, CartState, EmailError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Environment configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A cart or checkout operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// An email argument is invalid.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Checkout was not confirmed.
    #[error("Checkout cancelled: pass --yes to place the order")]
    NotConfirmed,
}

/// Build a client from environment configuration.
fn client() -> Result<ApiClient, CommandError> {
    let config = ApiConfig::from_env()?;
    tracing::debug!(?config, "Loaded API configuration");
    Ok(ApiClient::new(&config)?)
}

/// Print a cart with per-line and grand totals.
#[allow(clippy::print_stdout)]
fn print_cart(cart: &CartState) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    let totals = cart.totals();
    for (line, total) in cart.lines().iter().zip(&totals.lines) {
        println!(
            "{:>6}  {} {:<32} {:>3} x {:>10} = {:>10}",
            line.product_id().to_string(),
            line.image().unwrap_or(" "),
            line.name(),
            line.quantity(),
            line.unit_price().to_string(),
            total.line_total.to_string(),
        );
    }
    println!("{} item(s), total {}", cart.item_count(), totals.grand_total);
}
