//! Back-office forms and their validation.
//!
//! Every form field arrives as text so a rejected submission can be echoed
//! back exactly as typed. `validate` turns a form into a typed input or a set
//! of per-field messages.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use boutique_core::{Category, FieldErrors, Product, is_slug};

use crate::models::{NewsArticle, Voucher, VoucherKind};

const MAX_TITLE_CHARS: usize = 200;
const MAX_SUMMARY_CHARS: usize = 300;
const VOUCHER_CODE_CHARS: std::ops::RangeInclusive<usize> = 4..=20;

// =============================================================================
// Products
// =============================================================================

/// Product create/edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub compare_at_price: String,
    pub category: String,
    pub stock: String,
    /// Comma separated.
    pub sizes: String,
    /// Comma separated.
    pub colors: String,
    /// Checkbox: present when ticked.
    pub featured: Option<String>,
}

/// Validated product fields.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub category: Category,
    pub stock: u32,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub featured: bool,
}

impl ProductForm {
    /// Validate against the known categories.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self, categories: &[Category]) -> Result<ProductInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        errors.check(name.is_empty(), "name", "Name is required");

        let slug = self.slug.trim();
        errors.check(
            !is_slug(slug),
            "slug",
            "Slug must use lowercase letters, digits and single dashes",
        );

        let price = parse_decimal(&self.price);
        errors.check(
            !price.is_some_and(|p| p > Decimal::ZERO),
            "price",
            "Price must be greater than zero",
        );

        let compare_at_price = if self.compare_at_price.trim().is_empty() {
            None
        } else {
            let compare = parse_decimal(&self.compare_at_price);
            errors.check(
                !matches!((compare, price), (Some(c), Some(p)) if c > p),
                "compare_at_price",
                "Compare-at price must be higher than the price",
            );
            compare
        };

        let category = categories.iter().find(|c| c.slug == self.category.trim());
        errors.check(category.is_none(), "category", "Choose a category");

        let stock = self.stock.trim().parse::<u32>().ok();
        errors.check(stock.is_none(), "stock", "Stock must be a whole number, 0 or more");

        match (price, category, stock) {
            (Some(price), Some(category), Some(stock)) if errors.is_empty() => Ok(ProductInput {
                name: name.to_string(),
                slug: slug.to_string(),
                description: self.description.trim().to_string(),
                price,
                compare_at_price,
                category: category.clone(),
                stock,
                sizes: split_list(&self.sizes),
                colors: split_list(&self.colors),
                featured: self.featured.is_some(),
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            price: product.price.amount.to_string(),
            compare_at_price: product
                .compare_at_price
                .map(|p| p.amount.to_string())
                .unwrap_or_default(),
            category: product
                .category
                .as_ref()
                .map(|c| c.slug.clone())
                .unwrap_or_default(),
            stock: product.stock.to_string(),
            sizes: product.sizes.join(", "),
            colors: product.colors.join(", "),
            featured: product.featured.then(|| "on".to_string()),
        }
    }
}

// =============================================================================
// News
// =============================================================================

/// News article create/edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArticleForm {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    pub published: Option<String>,
}

/// Validated article fields.
#[derive(Debug, Clone)]
pub struct ArticleInput {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    pub published: bool,
}

impl ArticleForm {
    /// # Errors
    ///
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self) -> Result<ArticleInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim();
        errors.check(title.is_empty(), "title", "Title is required");
        errors.check(
            title.chars().count() > MAX_TITLE_CHARS,
            "title",
            "Title must be 200 characters or fewer",
        );
        errors.check(
            !is_slug(self.slug.trim()),
            "slug",
            "Slug must use lowercase letters, digits and single dashes",
        );
        errors.check(
            self.summary.trim().chars().count() > MAX_SUMMARY_CHARS,
            "summary",
            "Summary must be 300 characters or fewer",
        );
        errors.check(self.body.trim().is_empty(), "body", "Body is required");

        errors.into_result(ArticleInput {
            title: title.to_string(),
            slug: self.slug.trim().to_string(),
            summary: self.summary.trim().to_string(),
            body: self.body.trim().to_string(),
            published: self.published.is_some(),
        })
    }
}

impl From<&NewsArticle> for ArticleForm {
    fn from(article: &NewsArticle) -> Self {
        Self {
            title: article.title.clone(),
            slug: article.slug.clone(),
            summary: article.summary.clone(),
            body: article.body.clone(),
            published: article.published.then(|| "on".to_string()),
        }
    }
}

// =============================================================================
// Vouchers
// =============================================================================

/// Voucher create/edit form.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoucherForm {
    pub code: String,
    pub kind: String,
    pub value: String,
    pub usage_limit: String,
    /// `YYYY-MM-DD`, as sent by a date input.
    pub expires_on: String,
    /// Checkbox: absent when unticked, whatever the blank form shows.
    #[serde(default)]
    pub active: Option<String>,
}

impl Default for VoucherForm {
    fn default() -> Self {
        Self {
            code: String::new(),
            kind: VoucherKind::Percent.as_str().to_string(),
            value: String::new(),
            usage_limit: String::new(),
            expires_on: String::new(),
            active: Some("on".to_string()),
        }
    }
}

/// Validated voucher fields.
#[derive(Debug, Clone)]
pub struct VoucherInput {
    pub code: String,
    pub kind: VoucherKind,
    pub value: Decimal,
    pub usage_limit: Option<u32>,
    pub expires_on: Option<NaiveDate>,
    pub active: bool,
}

impl VoucherForm {
    /// # Errors
    ///
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self) -> Result<VoucherInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let code = self.code.trim().to_ascii_uppercase();
        errors.check(
            !(VOUCHER_CODE_CHARS.contains(&code.len())
                && code.chars().all(|c| c.is_ascii_alphanumeric())),
            "code",
            "Code must be 4-20 letters or digits",
        );

        let kind = VoucherKind::from_str(&self.kind).ok();
        errors.check(kind.is_none(), "kind", "Choose a voucher type");

        let value = parse_decimal(&self.value);
        match (kind, value) {
            (Some(VoucherKind::Percent), Some(v)) => errors.check(
                v < Decimal::ONE || v > Decimal::ONE_HUNDRED,
                "value",
                "Percentage must be between 1 and 100",
            ),
            (Some(VoucherKind::Fixed), Some(v)) => errors.check(
                v <= Decimal::ZERO,
                "value",
                "Amount must be greater than zero",
            ),
            (_, None) => errors.add("value", "Value must be a number"),
            (None, Some(_)) => {}
        }

        let usage_limit = if self.usage_limit.trim().is_empty() {
            None
        } else {
            let limit = self.usage_limit.trim().parse::<u32>().ok().filter(|n| *n > 0);
            errors.check(
                limit.is_none(),
                "usage_limit",
                "Usage limit must be a whole number above zero",
            );
            limit
        };

        let expires_on = if self.expires_on.trim().is_empty() {
            None
        } else {
            let date = NaiveDate::parse_from_str(self.expires_on.trim(), "%Y-%m-%d").ok();
            errors.check(date.is_none(), "expires_on", "Expiry must be a date");
            date
        };

        match (kind, value) {
            (Some(kind), Some(value)) if errors.is_empty() => Ok(VoucherInput {
                code,
                kind,
                value,
                usage_limit,
                expires_on,
                active: self.active.is_some(),
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Voucher> for VoucherForm {
    fn from(voucher: &Voucher) -> Self {
        Self {
            code: voucher.code.clone(),
            kind: voucher.kind.as_str().to_string(),
            value: voucher.value.to_string(),
            usage_limit: voucher.usage_limit.map(|n| n.to_string()).unwrap_or_default(),
            expires_on: voucher
                .expires_on
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            active: voucher.active.then(|| "on".to_string()),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim().trim_start_matches('$')).ok()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use boutique_core::seed::{demo_categories, demo_products};

    use super::*;

    fn product_form() -> ProductForm {
        ProductForm {
            name: "Linen Trouser".to_string(),
            slug: "linen-trouser".to_string(),
            description: "Wide leg.".to_string(),
            price: "79.00".to_string(),
            compare_at_price: String::new(),
            category: "bottoms".to_string(),
            stock: "12".to_string(),
            sizes: "S, M ,L,".to_string(),
            colors: String::new(),
            featured: Some("on".to_string()),
        }
    }

    #[test]
    fn test_product_form_valid() {
        let input = product_form().validate(&demo_categories()).unwrap();
        assert_eq!(input.price, Decimal::new(7900, 2));
        assert_eq!(input.category.slug, "bottoms");
        assert_eq!(input.sizes, vec!["S", "M", "L"]);
        assert!(input.colors.is_empty());
        assert!(input.featured);
    }

    #[test]
    fn test_product_form_rejects_bad_fields() {
        let form = ProductForm {
            name: "  ".to_string(),
            slug: "Linen Trouser".to_string(),
            price: "0".to_string(),
            category: "shoes".to_string(),
            stock: "-1".to_string(),
            ..product_form()
        };
        let errors = form.validate(&demo_categories()).unwrap_err();
        for field in ["name", "slug", "price", "category", "stock"] {
            assert!(errors.has(field), "expected an error for {field}");
        }
    }

    #[test]
    fn test_compare_price_must_exceed_price() {
        let form = ProductForm {
            compare_at_price: "50".to_string(),
            ..product_form()
        };
        let errors = form.validate(&demo_categories()).unwrap_err();
        assert!(errors.has("compare_at_price"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_product_form_prefills_from_product() {
        let products = demo_products();
        let form = ProductForm::from(&products[0]);
        assert_eq!(form.slug, "linen-camp-shirt");
        assert_eq!(form.sizes, "S, M, L, XL");
        assert!(form.validate(&demo_categories()).is_ok());
    }

    #[test]
    fn test_article_form() {
        let form = ArticleForm {
            title: "Autumn edit".to_string(),
            slug: "autumn-edit".to_string(),
            summary: String::new(),
            body: "New chore jackets.".to_string(),
            published: None,
        };
        let input = form.validate().unwrap();
        assert!(!input.published);

        let errors = ArticleForm::default().validate().unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("slug"));
        assert!(errors.has("body"));
    }

    #[test]
    fn test_voucher_code_is_uppercased() {
        let form = VoucherForm {
            code: " welcome10 ".to_string(),
            value: "10".to_string(),
            expires_on: "2026-12-31".to_string(),
            ..VoucherForm::default()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.code, "WELCOME10");
        assert_eq!(input.kind, VoucherKind::Percent);
        assert!(input.active);
        assert_eq!(input.expires_on, NaiveDate::from_ymd_opt(2026, 12, 31));
        assert!(input.usage_limit.is_none());
    }

    #[test]
    fn test_voucher_value_bounds_depend_on_kind() {
        let percent = VoucherForm {
            code: "BIG150".to_string(),
            value: "150".to_string(),
            ..VoucherForm::default()
        };
        assert!(percent.validate().unwrap_err().has("value"));

        let fixed = VoucherForm {
            kind: "fixed".to_string(),
            ..percent
        };
        assert!(fixed.validate().is_ok());
    }

    #[test]
    fn test_voucher_rejects_bad_code_and_limit() {
        let form = VoucherForm {
            code: "AB-1".to_string(),
            value: "5".to_string(),
            usage_limit: "0".to_string(),
            expires_on: "next week".to_string(),
            ..VoucherForm::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("code"));
        assert!(errors.has("usage_limit"));
        assert!(errors.has("expires_on"));
    }

    #[test]
    fn test_unticked_voucher_checkbox_deactivates() {
        let form: VoucherForm =
            serde_json::from_str(r#"{"code":"SPRING5","kind":"fixed","value":"5"}"#).unwrap();
        assert!(form.active.is_none());
        assert!(!form.validate().unwrap().active);
        assert!(VoucherForm::default().active.is_some());
    }
}
