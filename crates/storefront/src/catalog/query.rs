//! Listing filters, search, sort and pagination.

use serde::Deserialize;

use boutique_core::Product;

/// Products per listing page.
pub const PAGE_SIZE: usize = 12;

/// Listing sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    pub const ALL: [Self; 4] = [Self::Newest, Self::PriceAsc, Self::PriceDesc, Self::Name];

    /// Parse a query-string value; unknown values fall back to newest.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("price-asc") => Self::PriceAsc,
            Some("price-desc") => Self::PriceDesc,
            Some("name") => Self::Name,
            _ => Self::Newest,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Name => "name",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
            Self::Name => "Name",
        }
    }

    fn sort(self, products: &mut [Product]) {
        match self {
            Self::Newest => products.sort_by(|a, b| b.published_on.cmp(&a.published_on)),
            Self::PriceAsc => products.sort_by(|a, b| a.price.amount.cmp(&b.price.amount)),
            Self::PriceDesc => products.sort_by(|a, b| b.price.amount.cmp(&a.price.amount)),
            Self::Name => products.sort_by_key(|p| p.name.to_lowercase()),
        }
    }
}

/// Query parameters for `/products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
}

/// One page of listing results.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

impl ProductPage {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

impl ProductQuery {
    /// Non-blank category slug.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Non-blank search term.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn sort(&self) -> ProductSort {
        ProductSort::parse(self.sort.as_deref())
    }

    /// Filter, sort and paginate. Out-of-range pages clamp to the last page.
    #[must_use]
    pub fn apply(&self, mut products: Vec<Product>) -> ProductPage {
        if let Some(category) = self.category() {
            products.retain(|p| p.category.as_ref().is_some_and(|c| c.slug == category));
        }
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            products.retain(|p| {
                p.name.to_lowercase().contains(&term) || p.description.to_lowercase().contains(&term)
            });
        }
        self.sort().sort(&mut products);

        let total = products.len();
        let total_pages = total.div_ceil(PAGE_SIZE).max(1);
        let page = self.page.unwrap_or(1).clamp(1, total_pages);
        let products = products
            .into_iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();

        ProductPage {
            products,
            page,
            total_pages,
            total,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use boutique_core::seed::demo_products;

    use super::*;

    #[test]
    fn test_default_sort_is_newest_first() {
        let page = ProductQuery::default().apply(demo_products());
        assert_eq!(page.total, 10);
        assert_eq!(page.products[0].slug, "drawstring-short");
        assert!(
            page.products
                .windows(2)
                .all(|w| w[0].published_on >= w[1].published_on)
        );
    }

    #[test]
    fn test_category_filter() {
        let query = ProductQuery {
            category: Some("outerwear".to_string()),
            ..ProductQuery::default()
        };
        let page = query.apply(demo_products());
        assert_eq!(page.total, 2);
        assert!(
            page.products
                .iter()
                .all(|p| p.category.as_ref().unwrap().slug == "outerwear")
        );
    }

    #[test]
    fn test_search_matches_name_and_description_case_insensitively() {
        let query = ProductQuery {
            q: Some("  LINEN ".to_string()),
            ..ProductQuery::default()
        };
        let page = query.apply(demo_products());
        assert_eq!(page.total, 1);
        assert_eq!(page.products[0].slug, "linen-camp-shirt");
    }

    #[test]
    fn test_price_sort() {
        let query = ProductQuery {
            sort: Some("price-asc".to_string()),
            ..ProductQuery::default()
        };
        let page = query.apply(demo_products());
        assert_eq!(page.products[0].slug, "organic-crew-tee");

        let query = ProductQuery {
            sort: Some("price-desc".to_string()),
            ..ProductQuery::default()
        };
        assert_eq!(query.apply(demo_products()).products[0].slug, "chore-jacket");
    }

    #[test]
    fn test_unknown_sort_falls_back_to_newest() {
        assert_eq!(ProductSort::parse(Some("random")), ProductSort::Newest);
        assert_eq!(ProductSort::parse(None), ProductSort::Newest);
    }

    #[test]
    fn test_pagination_clamps() {
        let mut products = demo_products();
        let extra = demo_products();
        products.extend(extra);
        assert_eq!(products.len(), 20);

        let first = ProductQuery::default().apply(products.clone());
        assert_eq!(first.products.len(), PAGE_SIZE);
        assert_eq!(first.total_pages, 2);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let beyond = ProductQuery {
            page: Some(99),
            ..ProductQuery::default()
        };
        let last = beyond.apply(products);
        assert_eq!(last.page, 2);
        assert_eq!(last.products.len(), 8);
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let query = ProductQuery {
            q: Some("nothing matches this".to_string()),
            ..ProductQuery::default()
        };
        let page = query.apply(demo_products());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
    }
}
