//! Shopping-cart aggregate.
//!
//! A cart is an insertion-ordered list of line items plus the subset of line
//! items selected for checkout. Line items are keyed by a composite
//! `unique_id` (product id + variant), so the same product in two sizes takes
//! two rows while adding the same variant twice bumps a single row.
//!
//! # Invariants
//!
//! - `unique_id` is unique within the item list.
//! - Every id in the selection references an existing item. Removing an item
//!   drops it from the selection in the same call, and selection operations
//!   ignore unknown ids.
//! - `set_quantity` keeps quantities within `[1, max_stock]`. `add_item` does
//!   not clamp a merged quantity to `max_stock`; the ceiling is applied the
//!   next time the quantity is edited.
//!
//! The state is plain data: callers load it (from the session), apply one
//! operation and store it again. Deserialization re-establishes the
//! invariants, so a tampered or stale snapshot cannot smuggle dangling
//! selections or duplicate rows back in.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProductId, Variant};

/// Session key under which the cart is persisted.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// Errors raised by cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("{0} is out of stock")]
    OutOfStock(String),
    #[error("cart item not found: {0}")]
    ItemNotFound(String),
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub unique_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub image: Option<String>,
    pub quantity: u32,
    pub max_stock: u32,
    pub variant: Variant,
}

impl CartItem {
    /// Build a line for `quantity` units of a product variant.
    ///
    /// The `unique_id` is derived from `product_id` and `variant`.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Decimal,
        variant: Variant,
        quantity: u32,
        max_stock: u32,
    ) -> Self {
        Self {
            unique_id: variant.unique_id(product_id),
            product_id,
            name: name.into(),
            unit_price,
            image: None,
            quantity,
            max_stock,
            variant,
        }
    }

    /// Attach an image URL.
    #[must_use]
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Upper bound for quantity edits; never below 1.
    #[must_use]
    pub fn quantity_ceiling(&self) -> u32 {
        self.max_stock.max(1)
    }
}

/// The cart aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CartSnapshot", into = "CartSnapshot")]
pub struct CartState {
    items: Vec<CartItem>,
    selected_ids: BTreeSet<String>,
}

/// Wire form of [`CartState`].
#[derive(Serialize, Deserialize, Default)]
struct CartSnapshot {
    #[serde(default)]
    items: Vec<CartItem>,
    #[serde(default, rename = "selectedIds")]
    selected_ids: Vec<String>,
}

impl From<CartSnapshot> for CartState {
    fn from(snapshot: CartSnapshot) -> Self {
        let mut state = Self::default();
        for item in snapshot.items {
            if item.quantity == 0 || state.get(&item.unique_id).is_some() {
                continue;
            }
            state.items.push(item);
        }
        state.set_selection(snapshot.selected_ids);
        state
    }
}

impl From<CartState> for CartSnapshot {
    fn from(state: CartState) -> Self {
        Self {
            items: state.items,
            selected_ids: state.selected_ids.into_iter().collect(),
        }
    }
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line, merging into an existing line with the same `unique_id`.
    ///
    /// A merge adds the incoming quantity to the existing one and refreshes
    /// the stock ceiling; the merged quantity is not clamped here. Returns the
    /// line's resulting quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity and
    /// [`CartError::OutOfStock`] when the item has no stock at all.
    pub fn add_item(&mut self, item: CartItem) -> Result<u32, CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if item.max_stock == 0 {
            return Err(CartError::OutOfStock(item.name));
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.unique_id == item.unique_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            existing.max_stock = item.max_stock;
            return Ok(existing.quantity);
        }

        let quantity = item.quantity;
        self.items.push(item);
        Ok(quantity)
    }

    /// Remove a line and drop it from the selection.
    pub fn remove_item(&mut self, unique_id: &str) -> Option<CartItem> {
        let index = self.position(unique_id)?;
        self.selected_ids.remove(unique_id);
        Some(self.items.remove(index))
    }

    /// Set a line's quantity, clamped to `[1, max_stock]`.
    ///
    /// Returns the stored quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] for an unknown id.
    pub fn set_quantity(&mut self, unique_id: &str, quantity: i64) -> Result<u32, CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.unique_id == unique_id)
            .ok_or_else(|| CartError::ItemNotFound(unique_id.to_string()))?;
        let ceiling = item.quantity_ceiling();
        item.quantity = u32::try_from(quantity.clamp(1, i64::from(ceiling))).unwrap_or(ceiling);
        Ok(item.quantity)
    }

    /// Flip the selection state of a line.
    ///
    /// Returns the new state; unknown ids are ignored and report `false`.
    pub fn toggle_select(&mut self, unique_id: &str) -> bool {
        if self.position(unique_id).is_none() {
            return false;
        }
        if self.selected_ids.remove(unique_id) {
            false
        } else {
            self.selected_ids.insert(unique_id.to_string());
            true
        }
    }

    /// Select every line, or clear the selection.
    pub fn select_all(&mut self, selected: bool) {
        self.selected_ids = if selected {
            self.items.iter().map(|i| i.unique_id.clone()).collect()
        } else {
            BTreeSet::new()
        };
    }

    /// Replace the selection; ids without a matching line are dropped.
    pub fn set_selection<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected = ids
            .into_iter()
            .filter(|id| self.position(id.as_ref()).is_some())
            .map(|id| id.as_ref().to_string())
            .collect();
        self.selected_ids = selected;
    }

    /// Empty both the items and the selection.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected_ids.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line.
    #[must_use]
    pub fn get(&self, unique_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.unique_id == unique_id)
    }

    /// Selected ids in sorted order.
    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.selected_ids.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_selected(&self, unique_id: &str) -> bool {
        self.selected_ids.contains(unique_id)
    }

    /// Selected lines in cart order.
    pub fn selected_items(&self) -> impl Iterator<Item = &CartItem> {
        self.items
            .iter()
            .filter(|i| self.selected_ids.contains(&i.unique_id))
    }

    /// Whether every line is selected (false for an empty cart).
    #[must_use]
    pub fn all_selected(&self) -> bool {
        !self.items.is_empty() && self.selected_ids.len() == self.items.len()
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selected_ids.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of `unit_price * quantity` over the selected lines.
    #[must_use]
    pub fn selected_total(&self) -> Decimal {
        self.selected_items().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }

    fn position(&self, unique_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.unique_id == unique_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(product: i32, size: &str, price_cents: i64, quantity: u32, max_stock: u32) -> CartItem {
        CartItem::new(
            ProductId::new(product),
            format!("Product {product}"),
            Decimal::new(price_cents, 2),
            Variant::new(Some(size), Some("Black")),
            quantity,
            max_stock,
        )
    }

    #[test]
    fn test_add_same_variant_merges_quantity() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "M", 1000, 1, 10)).unwrap();
        cart.add_item(item(1, "M", 1000, 2, 10)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_other_variant_appends_in_order() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "M", 1000, 1, 10)).unwrap();
        cart.add_item(item(2, "S", 500, 1, 10)).unwrap();
        cart.add_item(item(1, "L", 1000, 1, 10)).unwrap();

        let ids: Vec<&str> = cart.items().iter().map(|i| i.unique_id.as_str()).collect();
        assert_eq!(ids, ["1-M-Black", "2-S-Black", "1-L-Black"]);
    }

    #[test]
    fn test_add_does_not_clamp_to_stock() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "M", 1000, 2, 3)).unwrap();
        let merged = cart.add_item(item(1, "M", 1000, 2, 3)).unwrap();
        assert_eq!(merged, 4);

        // The next explicit edit brings it back under the ceiling.
        assert_eq!(cart.set_quantity("1-M-Black", 4).unwrap(), 3);
    }

    #[test]
    fn test_add_rejects_zero_quantity_and_no_stock() {
        let mut cart = CartState::new();
        assert_eq!(
            cart.add_item(item(1, "M", 1000, 0, 5)),
            Err(CartError::InvalidQuantity)
        );
        assert!(matches!(
            cart.add_item(item(1, "M", 1000, 1, 0)),
            Err(CartError::OutOfStock(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_purges_selection() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "M", 1000, 1, 10)).unwrap();
        cart.add_item(item(2, "M", 2000, 1, 10)).unwrap();
        cart.select_all(true);

        let removed = cart.remove_item("1-M-Black").unwrap();
        assert_eq!(removed.product_id, ProductId::new(1));
        assert!(!cart.is_selected("1-M-Black"));
        assert_eq!(cart.selected_ids().collect::<Vec<_>>(), ["2-M-Black"]);
        assert!(cart.remove_item("1-M-Black").is_none());
    }

    #[test]
    fn test_set_quantity_clamps_to_range() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "M", 1000, 2, 5)).unwrap();

        for (requested, expected) in [(0, 1), (-7, 1), (3, 3), (5, 5), (99, 5), (i64::MAX, 5)] {
            assert_eq!(cart.set_quantity("1-M-Black", requested).unwrap(), expected);
        }
        assert_eq!(
            cart.set_quantity("missing", 2),
            Err(CartError::ItemNotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_selection_ignores_unknown_ids() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "M", 1000, 1, 10)).unwrap();

        assert!(!cart.toggle_select("nope"));
        cart.set_selection(["nope", "1-M-Black"]);
        assert_eq!(cart.selected_ids().collect::<Vec<_>>(), ["1-M-Black"]);
    }

    #[test]
    fn test_toggle_and_select_all() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "M", 1000, 1, 10)).unwrap();
        cart.add_item(item(2, "M", 1000, 1, 10)).unwrap();

        assert!(cart.toggle_select("1-M-Black"));
        assert!(!cart.all_selected());
        assert!(!cart.toggle_select("1-M-Black"));
        assert!(!cart.has_selection());

        cart.select_all(true);
        assert!(cart.all_selected());
        cart.select_all(false);
        assert!(!cart.has_selection());
    }

    #[test]
    fn test_totals() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "M", 1250, 2, 10)).unwrap(); // 25.00
        cart.add_item(item(2, "M", 999, 3, 10)).unwrap(); // 29.97
        cart.add_item(item(3, "M", 100, 1, 10)).unwrap(); // 1.00
        cart.set_selection(["1-M-Black", "3-M-Black"]);

        assert_eq!(cart.total(), Decimal::new(5597, 2));
        assert_eq!(cart.selected_total(), Decimal::new(2600, 2));
        let expected: Decimal = cart.selected_items().map(CartItem::line_total).sum();
        assert_eq!(cart.selected_total(), expected);
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn test_clear_empties_items_and_selection() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "M", 1000, 1, 10)).unwrap();
        cart.select_all(true);
        cart.clear();

        assert!(cart.is_empty());
        assert!(!cart.has_selection());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_restores_invariants() {
        let json = serde_json::json!({
            "items": [
                serde_json::to_value(item(1, "M", 1000, 1, 10)).unwrap(),
                serde_json::to_value(item(1, "M", 1000, 4, 10)).unwrap(),
                serde_json::to_value(item(2, "S", 1000, 0, 10)).unwrap(),
            ],
            "selectedIds": ["1-M-Black", "ghost"],
        });

        let cart: CartState = serde_json::from_value(json).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.selected_ids().collect::<Vec<_>>(), ["1-M-Black"]);
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "M", 1000, 2, 10)).unwrap();
        cart.toggle_select("1-M-Black");

        let json = serde_json::to_string(&cart).unwrap();
        let restored: CartState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
