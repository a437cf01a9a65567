//! Core types for Boutique.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod status;
pub mod validation;
pub mod variant;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::{Category, Product};
pub use status::{OrderStatus, StatusTransitionError};
pub use validation::{FieldErrors, is_phone, is_slug};
pub use variant::Variant;
