//! Tote Client - HTTP access to the Tote backend.
//!
//! [`ApiClient`] implements the two seams `tote-core` defines:
//! - [`tote_core::CartSync`] over `GET /cart`, `POST /cart/add`,
//!   `PUT /cart/update/{id}` and `DELETE /cart/remove/{id}`
//! - [`tote_core::OrderSubmitter`] over `POST /orders`
//!
//! It also covers the rest of the storefront API: the catalog (cached), order
//! history, login and signup.
//!
//! # Example
//!
//! ```rust,ignore
//! use tote_client::{ApiClient, ApiConfig};
//! use tote_core::CartStore;
//!
//! let client = ApiClient::new(&ApiConfig::from_env()?)?;
//! let mut store = CartStore::with_sync(client.clone());
//! store.hydrate().await?;
//!
//! let product = client.get_product(ProductId::new(4)).await?;
//! store.add_product(&product).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod api;
pub mod config;
pub mod error;

pub use api::{ApiClient, AuthSession, REQUEST_ID_HEADER, User};
pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
