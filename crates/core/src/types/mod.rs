//! Core value types for Tote.
//!
//! This module provides type-safe wrappers for IDs, prices and emails, plus
//! the lenient numeric decoders used for backend payloads.

pub mod email;
pub mod id;
pub mod lenient;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
