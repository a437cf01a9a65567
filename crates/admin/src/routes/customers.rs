//! Customer route handlers.

use std::cmp::Ordering;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use tracing::instrument;

use boutique_core::CustomerId;

use super::orders::OrderRowView;
use super::{format_date, format_price, render};
use crate::components::data_table::{
    DataTableConfig, FilterOption, Page, SortDir, TableColumn, TableQuery, TableRow,
};
use crate::error::Result;
use crate::filters;
use crate::middleware::AdminLayout;
use crate::state::AppState;
use crate::store::CustomerSummary;

impl TableRow for CustomerSummary {
    const SORT_COLUMNS: &'static [&'static str] = &["name", "city", "orders", "spent", "joined"];
    const DEFAULT_SORT: (&'static str, SortDir) = ("joined", SortDir::Desc);

    fn matches(&self, term: &str) -> bool {
        let customer = &self.customer;
        customer.name.to_lowercase().contains(term)
            || customer.email.to_lowercase().contains(term)
            || customer.city.to_lowercase().contains(term)
            || customer.phone.as_deref().is_some_and(|p| p.contains(term))
    }

    fn compare(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "name" => self.customer.name.cmp(&other.customer.name),
            "city" => self.customer.city.cmp(&other.customer.city),
            "orders" => self.order_count.cmp(&other.order_count),
            "spent" => self.total_spent.cmp(&other.total_spent),
            _ => self.customer.joined_on.cmp(&other.customer.joined_on),
        }
        .then_with(|| self.customer.id.cmp(&other.customer.id))
    }

    fn status(&self) -> Option<&str> {
        Some(if self.customer.accepts_marketing {
            "subscribed"
        } else {
            "unsubscribed"
        })
    }
}

/// Table configuration for the customer listing.
#[must_use]
pub fn customers_table_config() -> DataTableConfig {
    DataTableConfig::new("/customers")
        .search_placeholder("Search by name, email, phone or city...")
        .empty_title("No customers match")
        .column(TableColumn::sortable("name", "Customer"))
        .column(TableColumn::sortable("city", "City"))
        .column(TableColumn::sortable("orders", "Orders"))
        .column(TableColumn::sortable("spent", "Spent"))
        .column(TableColumn::sortable("joined", "Joined"))
        .status_option(FilterOption::new("subscribed", "Accepts marketing"))
        .status_option(FilterOption::new("unsubscribed", "No marketing"))
}

/// Customer view for templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: String,
    pub joined_on: String,
    pub accepts_marketing: bool,
    pub order_count: usize,
    pub total_spent: String,
}

impl From<&CustomerSummary> for CustomerView {
    fn from(summary: &CustomerSummary) -> Self {
        let customer = &summary.customer;
        Self {
            id: customer.id.as_i32(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            city: customer.city.clone(),
            joined_on: format_date(customer.joined_on),
            accepts_marketing: customer.accepts_marketing,
            order_count: summary.order_count,
            total_spent: format_price(summary.total_spent),
        }
    }
}

/// Customers list page template.
#[derive(Template)]
#[template(path = "customers/index.html")]
pub struct CustomersIndexTemplate {
    pub layout: AdminLayout,
    pub config: DataTableConfig,
    pub page: Page<CustomerView>,
}

/// Customer detail page template.
#[derive(Template)]
#[template(path = "customers/show.html")]
pub struct CustomerShowTemplate {
    pub layout: AdminLayout,
    pub customer: CustomerView,
    pub orders: Vec<OrderRowView>,
}

/// Customers list page handler.
#[instrument(skip_all)]
pub async fn index(
    layout: AdminLayout,
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Html<String>> {
    let config = customers_table_config();
    let page = query
        .apply(&config, state.store().customer_summaries().await)
        .map(|summary| CustomerView::from(&summary));
    render(&CustomersIndexTemplate {
        layout,
        config,
        page,
    })
}

/// Customer detail page handler.
#[instrument(skip(layout, state))]
pub async fn show(
    layout: AdminLayout,
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<Html<String>> {
    let (summary, orders) = state.store().customer(id).await?;
    render(&CustomerShowTemplate {
        layout,
        customer: CustomerView::from(&summary),
        orders: orders.iter().map(OrderRowView::from).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    use chrono::Utc;

    use crate::store::AdminStore;

    #[tokio::test]
    async fn test_customer_table_sorts_by_spend() {
        let store = AdminStore::new(crate::store::demo_data(Utc::now()));
        let query = TableQuery {
            sort: Some("spent".to_string()),
            dir: Some("desc".to_string()),
            ..TableQuery::default()
        };
        let page = query.apply(&customers_table_config(), store.customer_summaries().await);
        assert!(
            page.rows
                .windows(2)
                .all(|w| w[0].total_spent >= w[1].total_spent)
        );
    }

    #[tokio::test]
    async fn test_customer_search_matches_email() {
        let store = AdminStore::new(crate::store::demo_data(Utc::now()));
        let summaries = store.customer_summaries().await;
        let email = summaries[0].customer.email.clone();
        let query = TableQuery {
            q: Some(email.to_uppercase()),
            ..TableQuery::default()
        };
        let page = query.apply(&customers_table_config(), summaries);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].customer.email, email);
    }
}
