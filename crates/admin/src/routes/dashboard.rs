//! Dashboard route handler.

use askama::Template;
use axum::{extract::State, response::Html};
use chrono::Utc;
use tracing::instrument;

use boutique_core::Product;

use super::{format_price, render};
use super::orders::OrderRowView;
use crate::error::Result;
use crate::filters;
use crate::middleware::AdminLayout;
use crate::state::AppState;
use crate::store::DashboardStats;

/// Dashboard metrics.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub revenue: String,
    pub orders: usize,
    pub customers: usize,
    pub active_vouchers: usize,
}

/// One bar of the orders-by-status breakdown.
#[derive(Debug, Clone)]
pub struct StatusCountView {
    pub status: &'static str,
    pub label: &'static str,
    pub count: usize,
    /// Share of all orders, 0-100.
    pub percent: usize,
}

/// Low-stock product row.
#[derive(Debug, Clone)]
pub struct LowStockView {
    pub id: i32,
    pub name: String,
    pub stock: u32,
}

impl From<&Product> for LowStockView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            stock: product.stock,
        }
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: AdminLayout,
    pub metrics: DashboardMetrics,
    pub status_counts: Vec<StatusCountView>,
    pub recent_orders: Vec<OrderRowView>,
    pub low_stock: Vec<LowStockView>,
}

fn status_counts(stats: &DashboardStats) -> Vec<StatusCountView> {
    let total = stats.order_count.max(1);
    stats
        .orders_by_status
        .iter()
        .map(|(status, count)| StatusCountView {
            status: status.as_str(),
            label: status.label(),
            count: *count,
            percent: count * 100 / total,
        })
        .collect()
}

/// Dashboard page handler.
#[instrument(skip_all)]
pub async fn dashboard(layout: AdminLayout, State(state): State<AppState>) -> Result<Html<String>> {
    let stats = state.store().dashboard(Utc::now().date_naive()).await;

    let template = DashboardTemplate {
        layout,
        metrics: DashboardMetrics {
            revenue: format_price(stats.revenue),
            orders: stats.order_count,
            customers: stats.customer_count,
            active_vouchers: stats.active_vouchers,
        },
        status_counts: status_counts(&stats),
        recent_orders: stats.recent_orders.iter().map(OrderRowView::from).collect(),
        low_stock: stats.low_stock.iter().map(LowStockView::from).collect(),
    };
    render(&template)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    use boutique_core::OrderStatus;
    use rust_decimal::Decimal;

    #[test]
    fn test_status_counts_percentages() {
        let stats = DashboardStats {
            revenue: Decimal::ZERO,
            order_count: 4,
            orders_by_status: vec![(OrderStatus::Pending, 1), (OrderStatus::Completed, 3)],
            customer_count: 0,
            active_vouchers: 0,
            recent_orders: Vec::new(),
            low_stock: Vec::new(),
        };
        let counts = status_counts(&stats);
        assert_eq!(counts[0].percent, 25);
        assert_eq!(counts[1].percent, 75);
        assert_eq!(counts[1].label, "Completed");
    }

    #[test]
    fn test_status_counts_without_orders() {
        let stats = DashboardStats {
            revenue: Decimal::ZERO,
            order_count: 0,
            orders_by_status: vec![(OrderStatus::Pending, 0)],
            customer_count: 0,
            active_vouchers: 0,
            recent_orders: Vec::new(),
            low_stock: Vec::new(),
        };
        assert_eq!(status_counts(&stats)[0].percent, 0);
    }
}
