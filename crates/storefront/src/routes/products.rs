//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tracing::instrument;
use url::form_urlencoded;

use boutique_core::{Category, Product};

use super::format_price;
use crate::catalog::{ProductQuery, ProductSort};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// Stock at or below which the detail page warns that few are left.
const LOW_STOCK_THRESHOLD: u32 = 5;

/// Related products shown under a product.
const RELATED_LIMIT: usize = 4;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub category: Option<Category>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: u32,
}

impl ProductView {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    #[must_use]
    pub const fn low_stock(&self) -> bool {
        self.stock > 0 && self.stock <= LOW_STOCK_THRESHOLD
    }
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_price(product.unit_price()),
            compare_at_price: product
                .compare_at_price
                .filter(|_| product.on_sale())
                .map(|p| p.display()),
            image: product.featured_image().map(str::to_string),
            images: product.images.clone(),
            category: product.category.clone(),
            sizes: product.sizes.clone(),
            colors: product.colors.clone(),
            stock: product.stock,
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: PageContext,
    pub products: Vec<ProductView>,
    pub categories: Vec<Category>,
    pub active_category: Option<String>,
    pub q: String,
    pub sort: ProductSort,
    pub sorts: [ProductSort; 4],
    pub current_page: usize,
    pub total_pages: usize,
    pub total: usize,
}

impl ProductsIndexTemplate {
    /// Listing URL for another page with the current filters kept.
    #[must_use]
    pub fn page_href(&self, page: usize) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(category) = &self.active_category {
            query.append_pair("category", category);
        }
        if !self.q.is_empty() {
            query.append_pair("q", &self.q);
        }
        if self.sort != ProductSort::Newest {
            query.append_pair("sort", self.sort.as_str());
        }
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
        let query = query.finish();
        if query.is_empty() {
            "/products".to_string()
        } else {
            format!("/products?{query}")
        }
    }

    #[must_use]
    pub fn is_active_category(&self, slug: &str) -> bool {
        self.active_category.as_deref() == Some(slug)
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: PageContext,
    pub product: ProductView,
    pub related: Vec<ProductView>,
}

/// Display product listing page.
#[instrument(skip(state, layout))]
pub async fn index(
    State(state): State<AppState>,
    layout: PageContext,
    Query(query): Query<ProductQuery>,
) -> impl IntoResponse {
    let page = state.catalog().search(&query).await;
    let categories = state.catalog().categories().await;

    ProductsIndexTemplate {
        layout,
        products: page.products.iter().map(ProductView::from).collect(),
        categories,
        active_category: query.category().map(str::to_string),
        q: query.search_term().unwrap_or_default().to_string(),
        sort: query.sort(),
        sorts: ProductSort::ALL,
        current_page: page.page,
        total_pages: page.total_pages,
        total: page.total,
    }
}

/// Display product detail page.
#[instrument(skip(state, layout))]
pub async fn show(
    State(state): State<AppState>,
    layout: PageContext,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let product = state
        .catalog()
        .product(&slug)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let category = product.category.as_ref().map(|c| c.slug.as_str());
    let related = state
        .catalog()
        .products(category)
        .await
        .iter()
        .filter(|p| p.id != product.id)
        .take(RELATED_LIMIT)
        .map(ProductView::from)
        .collect();

    Ok(ProductShowTemplate {
        layout,
        product: ProductView::from(&product),
        related,
    })
}
