//! Product catalog backed by either the CMS or the built-in demo data.
//!
//! Page handlers never see CMS failures: a failed read is logged and the
//! page renders with an empty result instead of an error page.

mod query;

use std::sync::Arc;

use tracing::warn;

use boutique_core::seed::{demo_categories, demo_products};
use boutique_core::{Category, Product};

use crate::cms::CmsClient;

pub use query::{PAGE_SIZE, ProductPage, ProductQuery, ProductSort};

/// Products shown on the home page.
const FEATURED_LIMIT: usize = 4;

/// Catalog source.
#[derive(Clone)]
pub enum Catalog {
    /// In-memory demo catalog, used when no CMS is configured.
    Demo(Arc<DemoCatalog>),
    /// Headless CMS.
    Cms(CmsClient),
}

pub struct DemoCatalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    /// The built-in demo catalog.
    #[must_use]
    pub fn demo() -> Self {
        Self::Demo(Arc::new(DemoCatalog {
            products: demo_products(),
            categories: demo_categories(),
        }))
    }

    #[must_use]
    pub const fn source_name(&self) -> &'static str {
        match self {
            Self::Demo(_) => "demo",
            Self::Cms(_) => "cms",
        }
    }

    /// All products, optionally within one category.
    pub async fn products(&self, category: Option<&str>) -> Vec<Product> {
        match self {
            Self::Demo(demo) => demo
                .products
                .iter()
                .filter(|p| {
                    category.is_none_or(|slug| p.category.as_ref().is_some_and(|c| c.slug == slug))
                })
                .cloned()
                .collect(),
            Self::Cms(client) => match client.products(category).await {
                Ok(products) => products.as_ref().clone(),
                Err(e) => {
                    warn!(error = %e, category = ?category, "Failed to load products from CMS");
                    Vec::new()
                }
            },
        }
    }

    /// One product by slug.
    pub async fn product(&self, slug: &str) -> Option<Product> {
        match self {
            Self::Demo(demo) => demo.products.iter().find(|p| p.slug == slug).cloned(),
            Self::Cms(client) => match client.product_by_slug(slug).await {
                Ok(product) => product,
                Err(e) => {
                    warn!(error = %e, slug = %slug, "Failed to load product from CMS");
                    None
                }
            },
        }
    }

    pub async fn categories(&self) -> Vec<Category> {
        match self {
            Self::Demo(demo) => demo.categories.clone(),
            Self::Cms(client) => match client.categories().await {
                Ok(categories) => categories.as_ref().clone(),
                Err(e) => {
                    warn!(error = %e, "Failed to load categories from CMS");
                    Vec::new()
                }
            },
        }
    }

    /// Filtered, sorted and paginated listing.
    pub async fn search(&self, query: &ProductQuery) -> ProductPage {
        let products = self.products(query.category()).await;
        query.apply(products)
    }

    /// Featured products for the home page, falling back to the newest.
    pub async fn featured(&self) -> Vec<Product> {
        let mut products = self.products(None).await;
        products.sort_by(|a, b| b.published_on.cmp(&a.published_on));
        let featured: Vec<Product> = products
            .iter()
            .filter(|p| p.featured)
            .take(FEATURED_LIMIT)
            .cloned()
            .collect();
        if featured.is_empty() {
            products.truncate(FEATURED_LIMIT);
            return products;
        }
        featured
    }

    /// Whether the backing source is reachable.
    pub async fn is_ready(&self) -> bool {
        match self {
            Self::Demo(_) => true,
            Self::Cms(client) => client.categories().await.is_ok(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_product_lookup() {
        let catalog = Catalog::demo();
        let product = catalog.product("merino-polo").await.unwrap();
        assert_eq!(product.stock, 4);
        assert!(catalog.product("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_demo_category_filter() {
        let catalog = Catalog::demo();
        let accessories = catalog.products(Some("accessories")).await;
        assert_eq!(accessories.len(), 2);
        assert!(catalog.products(Some("unknown")).await.is_empty());
    }

    #[tokio::test]
    async fn test_featured_is_limited_and_flagged() {
        let featured = Catalog::demo().featured().await;
        assert_eq!(featured.len(), FEATURED_LIMIT);
        assert!(featured.iter().all(|p| p.featured));
    }

    #[tokio::test]
    async fn test_demo_is_ready() {
        assert!(Catalog::demo().is_ready().await);
        assert_eq!(Catalog::demo().source_name(), "demo");
    }
}
