//! Boutique Core - Shared domain types.
//!
//! This crate provides the types used by both Boutique binaries:
//! - `storefront` - Public-facing shop (listing, product detail, cart, checkout)
//! - `admin` - Back-office panel (products, orders, customers, news, vouchers)
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no HTTP clients, no session handling. The binaries load and persist state;
//! this crate decides what the state is allowed to look like.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, emails, variants, statuses, catalog entities
//! - [`cart`] - The shopping-cart aggregate (line items + checkout selection)
//! - [`seed`] - Demo catalog shared by the storefront mock mode and the admin panel

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod seed;
pub mod types;

pub use cart::{CART_STORAGE_KEY, CartError, CartItem, CartState};
pub use types::*;
