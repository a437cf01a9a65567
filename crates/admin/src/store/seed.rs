//! Demo back-office data.
//!
//! Products come from the shared demo catalog; orders, customers, news and
//! vouchers are generated here with dates relative to `now` so the dashboard
//! always has recent activity.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;

use boutique_core::seed::{demo_categories, demo_products};
use boutique_core::{ArticleId, CustomerId, OrderId, OrderStatus, Product, ProductId, VoucherId};

use super::StoreData;
use crate::models::{Customer, NewsArticle, Order, OrderLine, Voucher, VoucherKind};

struct CustomerSeed {
    name: &'static str,
    email: &'static str,
    phone: Option<&'static str>,
    city: &'static str,
    joined_days_ago: i64,
    accepts_marketing: bool,
}

const CUSTOMERS: &[CustomerSeed] = &[
    CustomerSeed {
        name: "Ada Lovelace",
        email: "ada@example.com",
        phone: Some("+44 20 7946 0018"),
        city: "London",
        joined_days_ago: 210,
        accepts_marketing: true,
    },
    CustomerSeed {
        name: "Grace Hopper",
        email: "grace@example.com",
        phone: None,
        city: "New York",
        joined_days_ago: 180,
        accepts_marketing: false,
    },
    CustomerSeed {
        name: "Katherine Johnson",
        email: "katherine@example.com",
        phone: Some("+1 757 555 0142"),
        city: "Hampton",
        joined_days_ago: 95,
        accepts_marketing: true,
    },
    CustomerSeed {
        name: "Alan Turing",
        email: "alan@example.com",
        phone: None,
        city: "Manchester",
        joined_days_ago: 60,
        accepts_marketing: false,
    },
    CustomerSeed {
        name: "Hedy Lamarr",
        email: "hedy@example.com",
        phone: Some("+1 310 555 0199"),
        city: "Los Angeles",
        joined_days_ago: 32,
        accepts_marketing: true,
    },
    CustomerSeed {
        name: "Linus Pauling",
        email: "linus@example.com",
        phone: None,
        city: "Portland",
        joined_days_ago: 9,
        accepts_marketing: false,
    },
];

struct OrderSeed {
    customer: i32,
    status: OrderStatus,
    days_ago: i64,
    /// `(product id, variant, quantity)`
    lines: &'static [(i32, Option<&'static str>, u32)],
}

const ORDERS: &[OrderSeed] = &[
    OrderSeed {
        customer: 1,
        status: OrderStatus::Completed,
        days_ago: 120,
        lines: &[(1, Some("M / Sand"), 1), (10, None, 1)],
    },
    OrderSeed {
        customer: 2,
        status: OrderStatus::Completed,
        days_ago: 90,
        lines: &[(5, Some("32 / Indigo"), 1)],
    },
    OrderSeed {
        customer: 1,
        status: OrderStatus::Returned,
        days_ago: 75,
        lines: &[(7, Some("L / Navy"), 1)],
    },
    OrderSeed {
        customer: 3,
        status: OrderStatus::Completed,
        days_ago: 40,
        lines: &[(2, Some("S / White"), 3), (9, None, 1)],
    },
    OrderSeed {
        customer: 4,
        status: OrderStatus::Cancelled,
        days_ago: 30,
        lines: &[(8, Some("M / Black"), 1)],
    },
    OrderSeed {
        customer: 2,
        status: OrderStatus::Refunding,
        days_ago: 21,
        lines: &[(3, Some("L / Navy"), 1)],
    },
    OrderSeed {
        customer: 5,
        status: OrderStatus::Completed,
        days_ago: 14,
        lines: &[(4, Some("32 / Khaki"), 2)],
    },
    OrderSeed {
        customer: 3,
        status: OrderStatus::Shipping,
        days_ago: 6,
        lines: &[(1, Some("L / Olive"), 1), (2, Some("L / Black"), 2)],
    },
    OrderSeed {
        customer: 6,
        status: OrderStatus::Shipping,
        days_ago: 4,
        lines: &[(9, None, 2)],
    },
    OrderSeed {
        customer: 5,
        status: OrderStatus::Processing,
        days_ago: 3,
        lines: &[(7, Some("M / Olive"), 1), (10, None, 1)],
    },
    OrderSeed {
        customer: 4,
        status: OrderStatus::Processing,
        days_ago: 2,
        lines: &[(5, Some("30 / Indigo"), 1)],
    },
    OrderSeed {
        customer: 1,
        status: OrderStatus::Pending,
        days_ago: 1,
        lines: &[(3, Some("M / Navy"), 1), (2, Some("M / White"), 1)],
    },
    OrderSeed {
        customer: 6,
        status: OrderStatus::Pending,
        days_ago: 0,
        lines: &[(8, Some("L / Black"), 1)],
    },
];

/// The full demo data set.
pub fn demo_data(now: DateTime<Utc>) -> StoreData {
    let products = demo_products();
    let customers = demo_customers(now);
    let orders = demo_orders(now, &products, &customers);

    StoreData {
        categories: demo_categories(),
        products,
        orders,
        customers,
        articles: demo_articles(now),
        vouchers: demo_vouchers(now),
    }
}

fn demo_customers(now: DateTime<Utc>) -> Vec<Customer> {
    CUSTOMERS
        .iter()
        .zip(1..)
        .map(|(seed, id)| Customer {
            id: CustomerId::new(id),
            name: seed.name.to_string(),
            email: seed.email.to_string(),
            phone: seed.phone.map(str::to_string),
            city: seed.city.to_string(),
            joined_on: (now - TimeDelta::days(seed.joined_days_ago)).date_naive(),
            accepts_marketing: seed.accepts_marketing,
        })
        .collect()
}

fn demo_orders(now: DateTime<Utc>, products: &[Product], customers: &[Customer]) -> Vec<Order> {
    ORDERS
        .iter()
        .zip(1..)
        .filter_map(|(seed, id)| {
            let customer = customers
                .iter()
                .find(|c| c.id == CustomerId::new(seed.customer))?;
            let lines = seed
                .lines
                .iter()
                .filter_map(|(product_id, variant, quantity)| {
                    let product = products
                        .iter()
                        .find(|p| p.id == ProductId::new(*product_id))?;
                    Some(OrderLine {
                        product_id: product.id,
                        name: product.name.clone(),
                        variant: variant.map(str::to_string),
                        quantity: *quantity,
                        unit_price: product.unit_price(),
                    })
                })
                .collect();
            Some(Order {
                id: OrderId::new(id),
                number: format!("BQ-{}", 1000 + id),
                customer_id: customer.id,
                customer_name: customer.name.clone(),
                email: customer.email.clone(),
                shipping_address: format!("1 Market Street, {}", customer.city),
                lines,
                status: seed.status,
                placed_at: now - TimeDelta::days(seed.days_ago) - TimeDelta::hours(i64::from(id)),
                history: Vec::new(),
            })
        })
        .collect()
}

fn demo_articles(now: DateTime<Utc>) -> Vec<NewsArticle> {
    vec![
        NewsArticle {
            id: ArticleId::new(1),
            title: "Meet the linen camp shirt".to_string(),
            slug: "meet-the-linen-camp-shirt".to_string(),
            summary: "Why we went back to European flax for our summer shirt.".to_string(),
            body: "Our camp shirt is cut from washed linen woven in Lithuania.".to_string(),
            published: true,
            published_on: Some((now - TimeDelta::days(150)).date_naive()),
            updated_at: now - TimeDelta::days(150),
        },
        NewsArticle {
            id: ArticleId::new(2),
            title: "Caring for selvedge denim".to_string(),
            slug: "caring-for-selvedge-denim".to_string(),
            summary: "Wash less, wear more.".to_string(),
            body: "Turn your jeans inside out and wash cold, rarely.".to_string(),
            published: true,
            published_on: Some((now - TimeDelta::days(45)).date_naive()),
            updated_at: now - TimeDelta::days(44),
        },
        NewsArticle {
            id: ArticleId::new(3),
            title: "Autumn outerwear preview".to_string(),
            slug: "autumn-outerwear-preview".to_string(),
            summary: "Chore jackets and rain shells for the season ahead.".to_string(),
            body: "Draft: photography pending.".to_string(),
            published: false,
            published_on: None,
            updated_at: now - TimeDelta::days(2),
        },
    ]
}

fn demo_vouchers(now: DateTime<Utc>) -> Vec<Voucher> {
    let today = now.date_naive();
    vec![
        Voucher {
            id: VoucherId::new(1),
            code: "WELCOME10".to_string(),
            kind: VoucherKind::Percent,
            value: Decimal::from(10),
            usage_limit: None,
            times_used: 42,
            expires_on: None,
            active: true,
        },
        Voucher {
            id: VoucherId::new(2),
            code: "AUTUMN25".to_string(),
            kind: VoucherKind::Fixed,
            value: Decimal::from(25),
            usage_limit: Some(100),
            times_used: 17,
            expires_on: Some(today + TimeDelta::days(30)),
            active: true,
        },
        Voucher {
            id: VoucherId::new(3),
            code: "SUMMER15".to_string(),
            kind: VoucherKind::Percent,
            value: Decimal::from(15),
            usage_limit: Some(200),
            times_used: 188,
            expires_on: Some(today - TimeDelta::days(20)),
            active: true,
        },
        Voucher {
            id: VoucherId::new(4),
            code: "VIPSHIP".to_string(),
            kind: VoucherKind::Fixed,
            value: Decimal::from(8),
            usage_limit: Some(5),
            times_used: 5,
            expires_on: None,
            active: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_order_resolves_its_lines() {
        let data = demo_data(Utc::now());
        assert_eq!(data.orders.len(), ORDERS.len());
        for (order, seed) in data.orders.iter().zip(ORDERS) {
            assert_eq!(order.lines.len(), seed.lines.len(), "order {}", order.number);
        }
    }

    #[test]
    fn test_order_numbers_are_unique() {
        let data = demo_data(Utc::now());
        let numbers: HashSet<_> = data.orders.iter().map(|o| o.number.as_str()).collect();
        assert_eq!(numbers.len(), data.orders.len());
    }
}
