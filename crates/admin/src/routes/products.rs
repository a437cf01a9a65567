//! Product route handlers.

use std::cmp::Ordering;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::{Category, FieldErrors, Product, ProductId};

use super::{format_date, format_price, render};
use crate::components::data_table::{
    DataTableConfig, FilterOption, Page, SortDir, TableColumn, TableQuery, TableRow,
};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::forms::ProductForm;
use crate::middleware::AdminLayout;
use crate::services::flash;
use crate::state::AppState;
use crate::store::{LOW_STOCK_THRESHOLD, StoreError};

/// Stock bucket used by the status filter.
fn stock_status(stock: u32) -> &'static str {
    match stock {
        0 => "sold-out",
        s if s <= LOW_STOCK_THRESHOLD => "low-stock",
        _ => "in-stock",
    }
}

impl TableRow for Product {
    const SORT_COLUMNS: &'static [&'static str] = &["name", "category", "price", "stock", "published"];
    const DEFAULT_SORT: (&'static str, SortDir) = ("published", SortDir::Desc);

    fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term)
            || self.slug.contains(term)
            || self
                .category
                .as_ref()
                .is_some_and(|c| c.name.to_lowercase().contains(term))
    }

    fn compare(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "name" => self.name.to_lowercase().cmp(&other.name.to_lowercase()),
            "category" => {
                let name = |p: &Self| p.category.as_ref().map(|c| c.name.clone());
                name(self).cmp(&name(other))
            }
            "price" => self.price.amount.cmp(&other.price.amount),
            "stock" => self.stock.cmp(&other.stock),
            _ => self.published_on.cmp(&other.published_on),
        }
        .then_with(|| self.id.cmp(&other.id))
    }

    fn status(&self) -> Option<&str> {
        Some(stock_status(self.stock))
    }
}

/// Table configuration for the product listing.
#[must_use]
pub fn products_table_config() -> DataTableConfig {
    DataTableConfig::new("/products")
        .search_placeholder("Search by name, slug or category...")
        .empty_title("No products match")
        .column(TableColumn::sortable("name", "Product"))
        .column(TableColumn::sortable("category", "Category"))
        .column(TableColumn::sortable("price", "Price"))
        .column(TableColumn::sortable("stock", "Stock"))
        .column(TableColumn::sortable("published", "Added"))
        .column(TableColumn::new("actions", ""))
        .status_option(FilterOption::new("in-stock", "In stock"))
        .status_option(FilterOption::new("low-stock", "Low stock"))
        .status_option(FilterOption::new("sold-out", "Sold out"))
}

/// Product row view for templates.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub stock: u32,
    pub stock_status: &'static str,
    pub featured: bool,
    pub published_on: String,
}

impl From<Product> for ProductRowView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i32(),
            stock_status: stock_status(product.stock),
            price: format_price(product.unit_price()),
            compare_at_price: product
                .compare_at_price
                .filter(|_| product.on_sale())
                .map(|p| p.display()),
            category: product.category.map(|c| c.name).unwrap_or_default(),
            published_on: format_date(product.published_on),
            name: product.name,
            slug: product.slug,
            stock: product.stock,
            featured: product.featured,
        }
    }
}

/// Products list page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: AdminLayout,
    pub config: DataTableConfig,
    pub page: Page<ProductRowView>,
}

/// Product create/edit form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: AdminLayout,
    /// `None` while creating.
    pub product_id: Option<i32>,
    pub form: ProductForm,
    pub errors: FieldErrors,
    pub categories: Vec<Category>,
}

impl ProductFormTemplate {
    #[must_use]
    pub fn action(&self) -> String {
        self.product_id
            .map_or_else(|| "/products".to_string(), |id| format!("/products/{id}"))
    }

    #[must_use]
    pub fn is_selected(&self, slug: &str) -> bool {
        self.form.category == slug
    }
}

/// Products list page handler.
#[instrument(skip_all)]
pub async fn index(
    layout: AdminLayout,
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Html<String>> {
    let config = products_table_config();
    let page = query
        .apply(&config, state.store().products().await)
        .map(ProductRowView::from);
    render(&ProductsIndexTemplate {
        layout,
        config,
        page,
    })
}

/// New product form.
pub async fn new(layout: AdminLayout, State(state): State<AppState>) -> Result<Html<String>> {
    render(&ProductFormTemplate {
        layout,
        product_id: None,
        form: ProductForm::default(),
        errors: FieldErrors::new(),
        categories: state.store().categories().await,
    })
}

/// Edit product form.
pub async fn edit(
    layout: AdminLayout,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Html<String>> {
    let product = state.store().product(id).await?;
    render(&ProductFormTemplate {
        layout,
        product_id: Some(id.as_i32()),
        form: ProductForm::from(&product),
        errors: FieldErrors::new(),
        categories: state.store().categories().await,
    })
}

/// Create a product.
#[instrument(skip(layout, state, session, form), fields(slug = %form.slug))]
pub async fn create(
    layout: AdminLayout,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    save(layout, &state, &session, None, form).await
}

/// Update a product.
#[instrument(skip(layout, state, session, form))]
pub async fn update(
    layout: AdminLayout,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    // 404 before validating a form for a product that is gone
    state.store().product(id).await?;
    save(layout, &state, &session, Some(id), form).await
}

async fn save(
    layout: AdminLayout,
    state: &AppState,
    session: &Session,
    id: Option<ProductId>,
    form: ProductForm,
) -> Result<Response> {
    let store = state.store();
    let categories = store.categories().await;

    let result = match form.validate(&categories) {
        Ok(input) => {
            let saved = match id {
                Some(id) => store.update_product(id, input).await,
                None => store.create_product(input, Utc::now().date_naive()).await,
            };
            match saved {
                Ok(product) => Ok(product),
                Err(StoreError::DuplicateSlug(slug)) => {
                    let mut errors = FieldErrors::new();
                    errors.add("slug", format!("Another product already uses \"{slug}\""));
                    Err(errors)
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(errors) => Err(errors),
    };

    match result {
        Ok(product) => {
            let verb = if id.is_some() { "updated" } else { "created" };
            add_breadcrumb("products", verb, &[("slug", &product.slug)]);
            tracing::info!(product_id = product.id.as_i32(), "Product {verb}");
            flash::set(session, format!("Product \"{}\" {verb}", product.name)).await?;
            Ok(Redirect::to("/products").into_response())
        }
        Err(errors) => {
            let template = ProductFormTemplate {
                layout,
                product_id: id.map(|id| id.as_i32()),
                form,
                errors,
                categories,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&template)?).into_response())
        }
    }
}

/// Delete a product.
#[instrument(skip(_layout, state, session))]
pub async fn delete(
    _layout: AdminLayout,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    let product = state.store().delete_product(id).await?;
    add_breadcrumb("products", "deleted", &[("slug", &product.slug)]);
    tracing::info!(product_id = id.as_i32(), "Product deleted");
    flash::set(&session, format!("Product \"{}\" deleted", product.name)).await?;
    Ok(Redirect::to("/products"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    use boutique_core::seed;

    #[test]
    fn test_stock_status_buckets() {
        assert_eq!(stock_status(0), "sold-out");
        assert_eq!(stock_status(LOW_STOCK_THRESHOLD), "low-stock");
        assert_eq!(stock_status(LOW_STOCK_THRESHOLD + 1), "in-stock");
    }

    #[test]
    fn test_product_table_sorts_by_price() {
        let query = TableQuery {
            sort: Some("price".to_string()),
            dir: Some("asc".to_string()),
            ..TableQuery::default()
        };
        let page = query.apply(&products_table_config(), seed::demo_products());
        let prices: Vec<_> = page.rows.iter().map(|p| p.price.amount).collect();
        let mut sorted = prices.clone();
        sorted.sort();
        assert_eq!(prices, sorted);
    }

    #[test]
    fn test_product_table_searches_category() {
        let products = seed::demo_products();
        let category = products[0].category.clone().unwrap();
        let query = TableQuery {
            q: Some(category.name.clone()),
            ..TableQuery::default()
        };
        let page = query.apply(&products_table_config(), products);
        assert!(page.rows.iter().any(|p| p.category.as_ref() == Some(&category)));
        let term = category.name.to_lowercase();
        assert!(page.rows.iter().all(|p| p.matches(&term)));
    }

    #[test]
    fn test_form_action_depends_on_mode() {
        let layout = AdminLayout {
            admin: crate::models::CurrentAdmin {
                username: "admin".to_string(),
                signed_in_at: Utc::now(),
            },
            admin_user: crate::middleware::AdminUserView {
                username: "admin".to_string(),
                initial: "A".to_string(),
            },
            current_path: "/products".to_string(),
            flash: None,
        };
        let mut template = ProductFormTemplate {
            layout,
            product_id: None,
            form: ProductForm::default(),
            errors: FieldErrors::new(),
            categories: Vec::new(),
        };
        assert_eq!(template.action(), "/products");
        template.product_id = Some(4);
        assert_eq!(template.action(), "/products/4");
    }
}
