//! Conversions from CMS wire types to domain types.

use chrono::Utc;
use url::Url;

use boutique_core::{Category, Price, Product, ProductId};

use super::types::{CategoryAttributes, Entry, ProductAttributes};

/// Resolve a media URL. The CMS returns upload paths relative to its origin.
pub fn media_url(media_base: &Url, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    media_base
        .join(url.trim_start_matches('/'))
        .map_or_else(|_| url.to_string(), String::from)
}

pub fn convert_category(entry: Entry<CategoryAttributes>) -> Category {
    Category {
        slug: entry.attributes.slug,
        name: entry.attributes.name,
    }
}

pub fn convert_product(entry: Entry<ProductAttributes>, media_base: &Url) -> Product {
    let attrs = entry.attributes;
    let images = attrs
        .images
        .and_then(|relation| relation.data)
        .unwrap_or_default()
        .into_iter()
        .map(|media| media_url(media_base, &media.attributes.url))
        .collect();

    Product {
        id: ProductId::new(entry.id),
        slug: attrs.slug,
        name: attrs.name,
        description: attrs.description.unwrap_or_default(),
        category: attrs
            .category
            .and_then(|relation| relation.data)
            .map(convert_category),
        price: Price::usd(attrs.price),
        compare_at_price: attrs.compare_at_price.map(Price::usd),
        images,
        sizes: attrs.sizes.unwrap_or_default(),
        colors: attrs.colors.unwrap_or_default(),
        stock: attrs.stock.unwrap_or(0),
        featured: attrs.featured.unwrap_or(false),
        published_on: attrs
            .published_at
            .unwrap_or_else(Utc::now)
            .date_naive(),
    }
}
