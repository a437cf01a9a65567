//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (username + Argon2 password)
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! POST /logout                 - Logout
//!
//! # Dashboard
//! GET  /                       - Dashboard overview
//!
//! # Products
//! GET  /products               - Product table (?q=&sort=&dir=&page=&status=)
//! GET  /products/new           - New product form
//! POST /products               - Create product
//! GET  /products/{id}/edit     - Edit product form
//! POST /products/{id}          - Update product
//! POST /products/{id}/delete   - Delete product
//!
//! # Orders
//! GET  /orders                 - Order table (?status= filter)
//! GET  /orders/{id}            - Order detail with status history
//! POST /orders/{id}/status     - Change status
//!
//! # Customers
//! GET  /customers              - Customer table
//! GET  /customers/{id}         - Customer detail with orders
//!
//! # News
//! GET  /news                   - Article table
//! GET  /news/new               - New article form
//! POST /news                   - Create article
//! GET  /news/{id}/edit         - Edit article form
//! POST /news/{id}              - Update article
//! POST /news/{id}/delete       - Delete article
//!
//! # Vouchers
//! GET  /vouchers               - Voucher table
//! GET  /vouchers/new           - New voucher form
//! POST /vouchers               - Create voucher
//! GET  /vouchers/{id}/edit     - Edit voucher form
//! POST /vouchers/{id}          - Update voucher
//! POST /vouchers/{id}/toggle   - Activate or deactivate
//! ```

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod news;
pub mod orders;
pub mod products;
pub mod vouchers;

use askama::Template;
use axum::{
    Router,
    response::Html,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use boutique_core::Price;

use crate::error::Result;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit))
        .route("/{id}/delete", post(products::delete))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::index))
        .route("/{id}", get(customers::show))
}

/// Create the news routes router.
pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(news::index).post(news::create))
        .route("/new", get(news::new))
        .route("/{id}", post(news::update))
        .route("/{id}/edit", get(news::edit))
        .route("/{id}/delete", post(news::delete))
}

/// Create the voucher routes router.
pub fn voucher_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(vouchers::index).post(vouchers::create))
        .route("/new", get(vouchers::new))
        .route("/{id}", post(vouchers::update))
        .route("/{id}/edit", get(vouchers::edit))
        .route("/{id}/toggle", post(vouchers::toggle))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/customers", customer_routes())
        .nest("/news", news_routes())
        .nest("/vouchers", voucher_routes())
}

/// Render a template into an HTML response.
pub(crate) fn render(template: &impl Template) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}

/// Format an amount in the shop currency.
pub(crate) fn format_price(amount: Decimal) -> String {
    Price::usd(amount).display()
}

/// Format a timestamp for tables.
pub(crate) fn format_datetime(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y %H:%M").to_string()
}

/// Format a date for tables.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
