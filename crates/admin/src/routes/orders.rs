//! Order route handlers.
//!
//! Operators may move an order to any status unless
//! `ADMIN_ENFORCE_STATUS_TRANSITIONS` is set, in which case only the
//! workflow successors are accepted. The detail page always highlights the
//! workflow successors.

use std::cmp::Ordering;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::{OrderId, OrderStatus};

use super::{format_datetime, format_price, render};
use crate::components::data_table::{
    DataTableConfig, FilterOption, Page, SortDir, TableColumn, TableQuery, TableRow,
};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::AdminLayout;
use crate::models::Order;
use crate::services::flash;
use crate::state::AppState;
use crate::store::StoreError;

impl TableRow for Order {
    const SORT_COLUMNS: &'static [&'static str] = &["number", "customer", "total", "status", "placed"];
    const DEFAULT_SORT: (&'static str, SortDir) = ("placed", SortDir::Desc);

    fn matches(&self, term: &str) -> bool {
        self.number.to_lowercase().contains(term)
            || self.customer_name.to_lowercase().contains(term)
            || self.email.to_lowercase().contains(term)
    }

    fn compare(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "number" => self.number.cmp(&other.number),
            "customer" => self.customer_name.cmp(&other.customer_name),
            "total" => self.total().cmp(&other.total()),
            "status" => self.status.as_str().cmp(other.status.as_str()),
            _ => self.placed_at.cmp(&other.placed_at),
        }
        .then_with(|| self.id.cmp(&other.id))
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

/// Table configuration for the order listing.
#[must_use]
pub fn orders_table_config() -> DataTableConfig {
    let config = DataTableConfig::new("/orders")
        .search_placeholder("Search by number, customer or email...")
        .empty_title("No orders match")
        .column(TableColumn::sortable("number", "Order"))
        .column(TableColumn::sortable("customer", "Customer"))
        .column(TableColumn::new("items", "Items"))
        .column(TableColumn::sortable("total", "Total"))
        .column(TableColumn::sortable("status", "Status"))
        .column(TableColumn::sortable("placed", "Placed"));
    OrderStatus::ALL.into_iter().fold(config, |config, status| {
        config.status_option(FilterOption::new(status.as_str(), status.label()))
    })
}

/// Order row view, shared with the dashboard and customer pages.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: i32,
    pub number: String,
    pub customer_id: i32,
    pub customer_name: String,
    pub item_count: u32,
    pub total: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub placed_at: String,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            number: order.number.clone(),
            customer_id: order.customer_id.as_i32(),
            customer_name: order.customer_name.clone(),
            item_count: order.item_count(),
            total: format_price(order.total()),
            status: order.status.as_str(),
            status_label: order.status.label(),
            placed_at: format_datetime(order.placed_at),
        }
    }
}

/// Order line view.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Status history entry view.
#[derive(Debug, Clone)]
pub struct StatusChangeView {
    pub from: &'static str,
    pub to: &'static str,
    pub at: String,
    pub by: String,
}

/// Choice in the status form.
#[derive(Debug, Clone)]
pub struct StatusOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub current: bool,
    /// Listed as a successor in the workflow table.
    pub suggested: bool,
    /// Selectable under the current enforcement setting.
    pub allowed: bool,
}

/// Order detail view.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub id: i32,
    pub number: String,
    pub customer_id: i32,
    pub customer_name: String,
    pub email: String,
    pub shipping_address: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub placed_at: String,
    pub total: String,
    pub lines: Vec<OrderLineView>,
    pub history: Vec<StatusChangeView>,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            number: order.number.clone(),
            customer_id: order.customer_id.as_i32(),
            customer_name: order.customer_name.clone(),
            email: order.email.clone(),
            shipping_address: order.shipping_address.clone(),
            status: order.status.as_str(),
            status_label: order.status.label(),
            placed_at: format_datetime(order.placed_at),
            total: format_price(order.total()),
            lines: order
                .lines
                .iter()
                .map(|line| OrderLineView {
                    name: line.name.clone(),
                    variant: line.variant.clone(),
                    quantity: line.quantity,
                    unit_price: format_price(line.unit_price),
                    line_total: format_price(line.line_total()),
                })
                .collect(),
            history: order
                .history
                .iter()
                .rev()
                .map(|change| StatusChangeView {
                    from: change.from.label(),
                    to: change.to.label(),
                    at: format_datetime(change.at),
                    by: change.by.clone(),
                })
                .collect(),
        }
    }
}

/// Status choices for an order in `current`.
fn status_options(current: OrderStatus, enforce: bool) -> Vec<StatusOptionView> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| {
            let suggested = current.can_transition_to(status);
            StatusOptionView {
                value: status.as_str(),
                label: status.label(),
                current: status == current,
                suggested,
                allowed: status == current || suggested || !enforce,
            }
        })
        .collect()
}

/// Orders list page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub layout: AdminLayout,
    pub config: DataTableConfig,
    pub page: Page<OrderRowView>,
}

/// Order detail page template.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub layout: AdminLayout,
    pub order: OrderDetailView,
    pub status_options: Vec<StatusOptionView>,
    pub enforce_transitions: bool,
    pub is_terminal: bool,
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Orders list page handler.
#[instrument(skip_all)]
pub async fn index(
    layout: AdminLayout,
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Html<String>> {
    let config = orders_table_config();
    let page = query
        .apply(&config, state.store().orders().await)
        .map(|order| OrderRowView::from(&order));
    render(&OrdersIndexTemplate {
        layout,
        config,
        page,
    })
}

/// Order detail page handler.
#[instrument(skip(layout, state))]
pub async fn show(
    layout: AdminLayout,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Html<String>> {
    let order = state.store().order(id).await?;
    let enforce = state.config().enforce_status_transitions;
    render(&OrderShowTemplate {
        layout,
        status_options: status_options(order.status, enforce),
        enforce_transitions: enforce,
        is_terminal: order.status.is_terminal(),
        order: OrderDetailView::from(&order),
    })
}

/// Change an order's status.
///
/// A transition rejected by the workflow table comes back to the detail page
/// as a notice rather than an error page.
#[instrument(skip(layout, state, session), fields(status = %form.status))]
pub async fn update_status(
    layout: AdminLayout,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let to: OrderStatus = form.status.parse().map_err(AppError::BadRequest)?;
    let enforce = state.config().enforce_status_transitions;
    let back = format!("/orders/{id}");

    let result = state
        .store()
        .change_order_status(id, to, enforce, &layout.admin.username, Utc::now())
        .await;

    let message = match result {
        Ok((order, true)) => {
            add_breadcrumb(
                "orders",
                "status changed",
                &[("number", &order.number), ("status", to.as_str())],
            );
            tracing::info!(order_id = id.as_i32(), status = to.as_str(), "Order status changed");
            format!("Order {} is now {}", order.number, to.label())
        }
        Ok((order, false)) => format!("Order {} is already {}", order.number, to.label()),
        Err(StoreError::Transition(e)) => {
            tracing::warn!(order_id = id.as_i32(), error = %e, "Status change rejected");
            format!(
                "Cannot move an order from {} to {}",
                e.from.label(),
                e.to.label()
            )
        }
        Err(e) => return Err(e.into()),
    };

    flash::set(&session, message).await?;
    Ok(Redirect::to(&back))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn option<'a>(options: &'a [StatusOptionView], value: &str) -> &'a StatusOptionView {
        options.iter().find(|o| o.value == value).unwrap()
    }

    #[test]
    fn test_status_options_without_enforcement() {
        let options = status_options(OrderStatus::Pending, false);
        assert_eq!(options.len(), OrderStatus::ALL.len());
        assert!(options.iter().all(|o| o.allowed));
        assert!(option(&options, "processing").suggested);
        assert!(option(&options, "cancelled").suggested);
        assert!(!option(&options, "completed").suggested);
        assert!(option(&options, "pending").current);
    }

    #[test]
    fn test_status_options_with_enforcement() {
        let options = status_options(OrderStatus::Shipping, true);
        let allowed: Vec<_> = options.iter().filter(|o| o.allowed).map(|o| o.value).collect();
        assert_eq!(allowed, vec!["shipping", "completed", "returned"]);
    }

    #[test]
    fn test_terminal_status_allows_nothing_new() {
        let options = status_options(OrderStatus::Cancelled, true);
        let allowed: Vec<_> = options.iter().filter(|o| o.allowed).map(|o| o.value).collect();
        assert_eq!(allowed, vec!["cancelled"]);
    }

    #[test]
    fn test_order_table_filters_by_status() {
        let orders = crate::store::demo_data(Utc::now()).orders;
        let query = TableQuery {
            status: Some("pending".to_string()),
            ..TableQuery::default()
        };
        let page = query.apply(&orders_table_config(), orders);
        assert!(!page.rows.is_empty());
        assert!(page.rows.iter().all(|o| o.status == OrderStatus::Pending));
        // newest first by default
        assert!(page.rows.windows(2).all(|w| w[0].placed_at >= w[1].placed_at));
    }
}
