//! Demo catalog.
//!
//! Served by the storefront when no CMS is configured and used to seed the
//! admin panel's in-memory collections.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::{Category, Price, Product, ProductId};

const APPAREL_SIZES: [&str; 4] = ["S", "M", "L", "XL"];

/// Catalog categories.
#[must_use]
pub fn demo_categories() -> Vec<Category> {
    vec![
        Category::new("tops", "Tops"),
        Category::new("bottoms", "Bottoms"),
        Category::new("outerwear", "Outerwear"),
        Category::new("accessories", "Accessories"),
    ]
}

struct Seed {
    id: i32,
    slug: &'static str,
    name: &'static str,
    category: &'static str,
    cents: i64,
    compare_cents: Option<i64>,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    stock: u32,
    featured: bool,
    published: (i32, u32, u32),
    description: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: 1,
        slug: "linen-camp-shirt",
        name: "Linen Camp Shirt",
        category: "tops",
        cents: 6_800,
        compare_cents: Some(8_500),
        sizes: &APPAREL_SIZES,
        colors: &["Sand", "Olive"],
        stock: 24,
        featured: true,
        published: (2026, 4, 2),
        description: "Relaxed camp-collar shirt in washed European linen.",
    },
    Seed {
        id: 2,
        slug: "organic-crew-tee",
        name: "Organic Crew Tee",
        category: "tops",
        cents: 2_900,
        compare_cents: None,
        sizes: &APPAREL_SIZES,
        colors: &["White", "Black", "Heather"],
        stock: 60,
        featured: true,
        published: (2026, 1, 15),
        description: "Midweight organic cotton tee with a clean crew neck.",
    },
    Seed {
        id: 3,
        slug: "merino-polo",
        name: "Merino Polo",
        category: "tops",
        cents: 7_900,
        compare_cents: None,
        sizes: &APPAREL_SIZES,
        colors: &["Navy"],
        stock: 4,
        featured: false,
        published: (2025, 11, 3),
        description: "Fine-gauge merino knit polo, breathable and soft.",
    },
    Seed {
        id: 4,
        slug: "pleated-chino",
        name: "Pleated Chino",
        category: "bottoms",
        cents: 8_900,
        compare_cents: None,
        sizes: &["28", "30", "32", "34", "36"],
        colors: &["Khaki", "Stone"],
        stock: 18,
        featured: true,
        published: (2026, 3, 20),
        description: "Single-pleat chino in brushed cotton twill.",
    },
    Seed {
        id: 5,
        slug: "selvedge-denim",
        name: "Selvedge Denim",
        category: "bottoms",
        cents: 14_500,
        compare_cents: Some(16_000),
        sizes: &["28", "30", "32", "34", "36"],
        colors: &["Indigo"],
        stock: 9,
        featured: false,
        published: (2025, 9, 12),
        description: "Straight-leg jeans cut from 14oz Japanese selvedge.",
    },
    Seed {
        id: 6,
        slug: "drawstring-short",
        name: "Drawstring Short",
        category: "bottoms",
        cents: 4_500,
        compare_cents: None,
        sizes: &APPAREL_SIZES,
        colors: &["Sand", "Black"],
        stock: 0,
        featured: false,
        published: (2026, 5, 1),
        description: "Lightweight short with an elastic drawstring waist.",
    },
    Seed {
        id: 7,
        slug: "chore-jacket",
        name: "Chore Jacket",
        category: "outerwear",
        cents: 16_800,
        compare_cents: None,
        sizes: &APPAREL_SIZES,
        colors: &["Ecru", "Navy"],
        stock: 7,
        featured: true,
        published: (2025, 10, 8),
        description: "Four-pocket work jacket in heavyweight canvas.",
    },
    Seed {
        id: 8,
        slug: "packable-rain-shell",
        name: "Packable Rain Shell",
        category: "outerwear",
        cents: 12_900,
        compare_cents: Some(14_900),
        sizes: &APPAREL_SIZES,
        colors: &["Black"],
        stock: 3,
        featured: false,
        published: (2026, 2, 11),
        description: "Seam-sealed shell that folds into its own pocket.",
    },
    Seed {
        id: 9,
        slug: "canvas-tote",
        name: "Canvas Tote",
        category: "accessories",
        cents: 3_500,
        compare_cents: None,
        sizes: &[],
        colors: &["Natural", "Black"],
        stock: 40,
        featured: false,
        published: (2025, 8, 19),
        description: "Heavy canvas tote with an interior zip pocket.",
    },
    Seed {
        id: 10,
        slug: "wool-beanie",
        name: "Wool Beanie",
        category: "accessories",
        cents: 3_200,
        compare_cents: None,
        sizes: &[],
        colors: &[],
        stock: 25,
        featured: false,
        published: (2025, 12, 1),
        description: "Ribbed lambswool beanie, one size.",
    },
];

/// Catalog products, newest seeds last.
#[must_use]
pub fn demo_products() -> Vec<Product> {
    let categories = demo_categories();
    SEEDS
        .iter()
        .map(|seed| {
            let (y, m, d) = seed.published;
            Product {
                id: ProductId::new(seed.id),
                slug: seed.slug.to_string(),
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                category: categories.iter().find(|c| c.slug == seed.category).cloned(),
                price: Price::usd(Decimal::new(seed.cents, 2)),
                compare_at_price: seed.compare_cents.map(|c| Price::usd(Decimal::new(c, 2))),
                images: vec![format!("/static/img/products/{}.svg", seed.slug)],
                sizes: seed.sizes.iter().map(|s| (*s).to_string()).collect(),
                colors: seed.colors.iter().map(|s| (*s).to_string()).collect(),
                stock: seed.stock,
                featured: seed.featured,
                published_on: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_seed_ids_and_slugs_are_unique() {
        let products = demo_products();
        let ids: HashSet<_> = products.iter().map(|p| p.id).collect();
        let slugs: HashSet<_> = products.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(ids.len(), products.len());
        assert_eq!(slugs.len(), products.len());
    }

    #[test]
    fn test_every_product_has_a_category() {
        assert!(demo_products().iter().all(|p| p.category.is_some()));
    }

    #[test]
    fn test_slugs_are_url_safe() {
        assert!(
            demo_products()
                .iter()
                .all(|p| crate::types::is_slug(&p.slug))
        );
    }
}
