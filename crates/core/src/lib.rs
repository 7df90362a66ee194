//! Tote Core - cart state, pricing and sync contracts.
//!
//! This crate holds everything about a shopping cart that does not need I/O:
//! - [`CartState`] and its mutation rules
//! - [`CartStore`], which owns a session's cart and drives remote sync
//! - checkout pricing ([`OrderSummary`]) and order payloads
//! - the [`CartSync`] and [`OrderSubmitter`] contracts that `tote-client`
//!   implements over HTTP
//!
//! # Architecture
//!
//! No HTTP clients and no global state live here. A remote cart or order
//! service is injected into the store, so the same code backs a client-local
//! cart, a server-authoritative cart, and in-memory fakes in tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and emails
//! - [`cart`] - Cart lines, totals and local mutations
//! - [`store`] - The cart store
//! - [`checkout`] - Pricing policy and order submission
//! - [`sync`] - Remote cart contract
//! - [`catalog`] - Catalog products
//! - [`orders`] - Order history

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod orders;
pub mod store;
pub mod sync;
pub mod types;

pub use cart::{CartChange, CartLine, CartState, LineTotal, Totals};
pub use catalog::Product;
pub use checkout::{
    OrderConfirmation, OrderItem, OrderRequest, OrderSubmitter, OrderSummary, ShippingAddress,
};
pub use error::{CartError, SubmitError, SyncError};
pub use orders::{OrderRecord, OrderRecordItem};
pub use store::CartStore;
pub use sync::{CartSync, Detached, RemoteCartLine};
pub use types::*;
