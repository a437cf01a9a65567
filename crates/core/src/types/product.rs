//! Catalog entities.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::variant::Variant;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
}

impl Category {
    #[must_use]
    pub fn new(slug: &str, name: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
        }
    }
}

/// A sellable product.
///
/// Stock is tracked per product, not per variant: every size/color of a
/// product shares the same `stock` ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub category: Option<Category>,
    pub price: Price,
    pub compare_at_price: Option<Price>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: u32,
    pub featured: bool,
    pub published_on: NaiveDate,
}

impl Product {
    /// First image, used for listing cards and cart rows.
    #[must_use]
    pub fn featured_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether the compare-at price marks this product as discounted.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.compare_at_price
            .is_some_and(|compare| compare.amount > self.price.amount)
    }

    /// Unit price amount.
    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.price.amount
    }

    /// Check that a requested variant is one this product offers.
    ///
    /// A product without sizes (or colors) only accepts an absent size (or
    /// color); a product with options requires one of them.
    #[must_use]
    pub fn offers(&self, variant: &Variant) -> bool {
        let matches = |options: &[String], choice: Option<&String>| match choice {
            Some(value) => options.iter().any(|o| o == value),
            None => options.is_empty(),
        };
        matches(&self.sizes, variant.size.as_ref()) && matches(&self.colors, variant.color.as_ref())
    }
}
