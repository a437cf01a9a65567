//! In-memory back-office collections.
//!
//! All collections live behind one `tokio::sync::RwLock`. Reads clone what
//! they return; every mutation holds the write lock for exactly one
//! operation, so concurrent operators see last-write-wins semantics.

mod seed;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::RwLock;

use boutique_core::{
    ArticleId, Category, CustomerId, OrderId, OrderStatus, Price, Product, ProductId,
    StatusTransitionError, VoucherId,
};

use crate::forms::{ArticleInput, ProductInput, VoucherInput};
use crate::models::{Customer, NewsArticle, Order, Voucher};

pub use seed::demo_data;

/// Stock at or below which a product is flagged on the dashboard.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Orders listed under "recent" on the dashboard.
const RECENT_ORDERS: usize = 5;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i32 },

    #[error("slug already in use: {0}")]
    DuplicateSlug(String),

    #[error("voucher code already exists: {0}")]
    DuplicateCode(String),

    #[error(transparent)]
    Transition(#[from] StatusTransitionError),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Every collection the back-office edits.
#[derive(Debug, Clone, Default)]
pub struct StoreData {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub customers: Vec<Customer>,
    pub articles: Vec<NewsArticle>,
    pub vouchers: Vec<Voucher>,
}

/// A customer with their order totals.
#[derive(Debug, Clone)]
pub struct CustomerSummary {
    pub customer: Customer,
    pub order_count: usize,
    pub total_spent: Decimal,
}

/// Dashboard figures.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    /// Sum of completed order totals.
    pub revenue: Decimal,
    pub order_count: usize,
    /// Order count for every status, in workflow order.
    pub orders_by_status: Vec<(OrderStatus, usize)>,
    pub customer_count: usize,
    /// Vouchers redeemable today.
    pub active_vouchers: usize,
    pub recent_orders: Vec<Order>,
    pub low_stock: Vec<Product>,
}

/// Shared handle to the back-office collections.
#[derive(Clone)]
pub struct AdminStore {
    data: Arc<RwLock<StoreData>>,
}

impl AdminStore {
    #[must_use]
    pub fn new(data: StoreData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Store seeded with the demo data set.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(demo_data(Utc::now()))
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn categories(&self) -> Vec<Category> {
        self.data.read().await.categories.clone()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.data.read().await.products.clone()
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id.
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        let data = self.data.read().await;
        find(&data.products, |p| p.id == id, "product", id.as_i32()).cloned()
    }

    /// # Errors
    ///
    /// Returns `StoreError::DuplicateSlug` when another product has the slug.
    pub async fn create_product(&self, input: ProductInput, today: NaiveDate) -> Result<Product> {
        let mut data = self.data.write().await;
        if data.products.iter().any(|p| p.slug == input.slug) {
            return Err(StoreError::DuplicateSlug(input.slug));
        }
        let id = ProductId::new(next_id(data.products.iter().map(|p| p.id.as_i32())));
        let product = Product {
            id,
            slug: input.slug,
            name: input.name,
            description: input.description,
            category: Some(input.category),
            price: Price::usd(input.price),
            compare_at_price: input.compare_at_price.map(Price::usd),
            images: Vec::new(),
            sizes: input.sizes,
            colors: input.colors,
            stock: input.stock,
            featured: input.featured,
            published_on: today,
        };
        data.products.push(product.clone());
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id or
    /// `StoreError::DuplicateSlug` when another product has the slug.
    pub async fn update_product(&self, id: ProductId, input: ProductInput) -> Result<Product> {
        let mut data = self.data.write().await;
        if data.products.iter().any(|p| p.id != id && p.slug == input.slug) {
            return Err(StoreError::DuplicateSlug(input.slug));
        }
        let product = find_mut(&mut data.products, |p| p.id == id, "product", id.as_i32())?;
        product.slug = input.slug;
        product.name = input.name;
        product.description = input.description;
        product.category = Some(input.category);
        product.price = Price::usd(input.price);
        product.compare_at_price = input.compare_at_price.map(Price::usd);
        product.sizes = input.sizes;
        product.colors = input.colors;
        product.stock = input.stock;
        product.featured = input.featured;
        Ok(product.clone())
    }

    /// Remove a product. Orders keep their own copy of the line names.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id.
    pub async fn delete_product(&self, id: ProductId) -> Result<Product> {
        let mut data = self.data.write().await;
        remove(&mut data.products, |p| p.id == id, "product", id.as_i32())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders, newest first.
    pub async fn orders(&self) -> Vec<Order> {
        let mut orders = self.data.read().await.orders.clone();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        orders
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id.
    pub async fn order(&self, id: OrderId) -> Result<Order> {
        let data = self.data.read().await;
        find(&data.orders, |o| o.id == id, "order", id.as_i32()).cloned()
    }

    /// Change an order's status. Returns the updated order and whether the
    /// status actually changed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id, or
    /// `StoreError::Transition` when `enforce` is set and the workflow table
    /// does not allow the change.
    pub async fn change_order_status(
        &self,
        id: OrderId,
        to: OrderStatus,
        enforce: bool,
        by: &str,
        at: DateTime<Utc>,
    ) -> Result<(Order, bool)> {
        let mut data = self.data.write().await;
        let order = find_mut(&mut data.orders, |o| o.id == id, "order", id.as_i32())?;
        let changed = order.change_status(to, enforce, by, at)?;
        Ok((order.clone(), changed))
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Customers with their order count and spend.
    pub async fn customer_summaries(&self) -> Vec<CustomerSummary> {
        let data = self.data.read().await;
        data.customers
            .iter()
            .map(|customer| summarize(customer, &data.orders))
            .collect()
    }

    /// One customer with totals and their orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id.
    pub async fn customer(&self, id: CustomerId) -> Result<(CustomerSummary, Vec<Order>)> {
        let data = self.data.read().await;
        let customer = find(&data.customers, |c| c.id == id, "customer", id.as_i32())?;
        let mut orders: Vec<Order> = data
            .orders
            .iter()
            .filter(|o| o.customer_id == id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok((summarize(customer, &data.orders), orders))
    }

    // =========================================================================
    // News
    // =========================================================================

    pub async fn articles(&self) -> Vec<NewsArticle> {
        self.data.read().await.articles.clone()
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id.
    pub async fn article(&self, id: ArticleId) -> Result<NewsArticle> {
        let data = self.data.read().await;
        find(&data.articles, |a| a.id == id, "article", id.as_i32()).cloned()
    }

    /// # Errors
    ///
    /// Returns `StoreError::DuplicateSlug` when another article has the slug.
    pub async fn create_article(
        &self,
        input: ArticleInput,
        now: DateTime<Utc>,
    ) -> Result<NewsArticle> {
        let mut data = self.data.write().await;
        if data.articles.iter().any(|a| a.slug == input.slug) {
            return Err(StoreError::DuplicateSlug(input.slug));
        }
        let article = NewsArticle {
            id: ArticleId::new(next_id(data.articles.iter().map(|a| a.id.as_i32()))),
            title: input.title,
            slug: input.slug,
            summary: input.summary,
            body: input.body,
            published: input.published,
            published_on: input.published.then(|| now.date_naive()),
            updated_at: now,
        };
        data.articles.push(article.clone());
        Ok(article)
    }

    /// Update an article. Publishing sets the publication date the first
    /// time; unpublishing keeps it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id or
    /// `StoreError::DuplicateSlug` when another article has the slug.
    pub async fn update_article(
        &self,
        id: ArticleId,
        input: ArticleInput,
        now: DateTime<Utc>,
    ) -> Result<NewsArticle> {
        let mut data = self.data.write().await;
        if data.articles.iter().any(|a| a.id != id && a.slug == input.slug) {
            return Err(StoreError::DuplicateSlug(input.slug));
        }
        let article = find_mut(&mut data.articles, |a| a.id == id, "article", id.as_i32())?;
        article.title = input.title;
        article.slug = input.slug;
        article.summary = input.summary;
        article.body = input.body;
        article.published = input.published;
        if input.published && article.published_on.is_none() {
            article.published_on = Some(now.date_naive());
        }
        article.updated_at = now;
        Ok(article.clone())
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id.
    pub async fn delete_article(&self, id: ArticleId) -> Result<NewsArticle> {
        let mut data = self.data.write().await;
        remove(&mut data.articles, |a| a.id == id, "article", id.as_i32())
    }

    // =========================================================================
    // Vouchers
    // =========================================================================

    pub async fn vouchers(&self) -> Vec<Voucher> {
        self.data.read().await.vouchers.clone()
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id.
    pub async fn voucher(&self, id: VoucherId) -> Result<Voucher> {
        let data = self.data.read().await;
        find(&data.vouchers, |v| v.id == id, "voucher", id.as_i32()).cloned()
    }

    /// # Errors
    ///
    /// Returns `StoreError::DuplicateCode` when the code is taken.
    pub async fn create_voucher(&self, input: VoucherInput) -> Result<Voucher> {
        let mut data = self.data.write().await;
        if data.vouchers.iter().any(|v| v.code == input.code) {
            return Err(StoreError::DuplicateCode(input.code));
        }
        let voucher = Voucher {
            id: VoucherId::new(next_id(data.vouchers.iter().map(|v| v.id.as_i32()))),
            code: input.code,
            kind: input.kind,
            value: input.value,
            usage_limit: input.usage_limit,
            times_used: 0,
            expires_on: input.expires_on,
            active: input.active,
        };
        data.vouchers.push(voucher.clone());
        Ok(voucher)
    }

    /// Update a voucher. The usage counter is kept.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id or
    /// `StoreError::DuplicateCode` when another voucher has the code.
    pub async fn update_voucher(&self, id: VoucherId, input: VoucherInput) -> Result<Voucher> {
        let mut data = self.data.write().await;
        if data.vouchers.iter().any(|v| v.id != id && v.code == input.code) {
            return Err(StoreError::DuplicateCode(input.code));
        }
        let voucher = find_mut(&mut data.vouchers, |v| v.id == id, "voucher", id.as_i32())?;
        voucher.code = input.code;
        voucher.kind = input.kind;
        voucher.value = input.value;
        voucher.usage_limit = input.usage_limit;
        voucher.expires_on = input.expires_on;
        voucher.active = input.active;
        Ok(voucher.clone())
    }

    /// Flip a voucher's active flag.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id.
    pub async fn toggle_voucher(&self, id: VoucherId) -> Result<Voucher> {
        let mut data = self.data.write().await;
        let voucher = find_mut(&mut data.vouchers, |v| v.id == id, "voucher", id.as_i32())?;
        voucher.active = !voucher.active;
        Ok(voucher.clone())
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    pub async fn dashboard(&self, today: NaiveDate) -> DashboardStats {
        let data = self.data.read().await;

        let revenue = data
            .orders
            .iter()
            .filter(|o| o.status.counts_as_revenue())
            .map(Order::total)
            .sum();
        let orders_by_status = OrderStatus::ALL
            .into_iter()
            .map(|status| {
                let count = data.orders.iter().filter(|o| o.status == status).count();
                (status, count)
            })
            .collect();

        let mut recent_orders = data.orders.clone();
        recent_orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        recent_orders.truncate(RECENT_ORDERS);

        let mut low_stock: Vec<Product> = data
            .products
            .iter()
            .filter(|p| p.stock <= LOW_STOCK_THRESHOLD)
            .cloned()
            .collect();
        low_stock.sort_by_key(|p| p.stock);

        DashboardStats {
            revenue,
            order_count: data.orders.len(),
            orders_by_status,
            customer_count: data.customers.len(),
            active_vouchers: data
                .vouchers
                .iter()
                .filter(|v| v.is_redeemable(today))
                .count(),
            recent_orders,
            low_stock,
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn summarize(customer: &Customer, orders: &[Order]) -> CustomerSummary {
    let own = orders.iter().filter(|o| o.customer_id == customer.id);
    CustomerSummary {
        customer: customer.clone(),
        order_count: own.clone().count(),
        total_spent: own
            .filter(|o| o.counts_towards_spend())
            .map(Order::total)
            .sum(),
    }
}

fn next_id(ids: impl Iterator<Item = i32>) -> i32 {
    ids.max().unwrap_or(0) + 1
}

fn find<'a, T>(
    items: &'a [T],
    pred: impl Fn(&T) -> bool,
    kind: &'static str,
    id: i32,
) -> Result<&'a T> {
    items
        .iter()
        .find(|item| pred(item))
        .ok_or(StoreError::NotFound { kind, id })
}

fn find_mut<'a, T>(
    items: &'a mut [T],
    pred: impl Fn(&T) -> bool,
    kind: &'static str,
    id: i32,
) -> Result<&'a mut T> {
    items
        .iter_mut()
        .find(|item| pred(item))
        .ok_or(StoreError::NotFound { kind, id })
}

fn remove<T>(
    items: &mut Vec<T>,
    pred: impl Fn(&T) -> bool,
    kind: &'static str,
    id: i32,
) -> Result<T> {
    let index = items
        .iter()
        .position(pred)
        .ok_or(StoreError::NotFound { kind, id })?;
    Ok(items.remove(index))
}
