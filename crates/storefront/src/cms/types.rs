//! Wire types for the headless CMS REST API.
//!
//! The CMS wraps every record as `{ "id": .., "attributes": { .. } }` and
//! every list as `{ "data": [..], "meta": { "pagination": .. } }`. Relations
//! are nested the same way and come back as `{ "data": null }` when empty.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A list response.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    pub data: Vec<Entry<T>>,
    #[serde(default)]
    pub meta: Meta,
}

/// A single record.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry<T> {
    pub id: i32,
    pub attributes: T,
}

/// A to-one relation.
#[derive(Debug, Clone, Deserialize)]
pub struct Relation<T> {
    pub data: Option<Entry<T>>,
}

/// A to-many relation.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationMany<T> {
    pub data: Option<Vec<Entry<T>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttributes {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub sizes: Option<Vec<String>>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub images: Option<RelationMany<MediaAttributes>>,
    #[serde(default)]
    pub category: Option<Relation<CategoryAttributes>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttributes {
    pub url: String,
    #[serde(default)]
    pub alternative_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryAttributes {
    pub name: String,
    pub slug: String,
}

/// `POST /api/auth/local` body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// `POST /api/auth/local/register` body.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful auth response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: CmsUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CmsUser {
    pub id: i32,
    pub username: String,
    pub email: String,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    #[serde(default)]
    pub name: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_product_collection() {
        let json = r#"{
            "data": [{
                "id": 12,
                "attributes": {
                    "name": "Linen Camp Shirt",
                    "slug": "linen-camp-shirt",
                    "price": 68.5,
                    "compareAtPrice": "85.00",
                    "stock": 3,
                    "sizes": ["S", "M"],
                    "colors": null,
                    "publishedAt": "2026-04-02T09:00:00.000Z",
                    "images": {"data": [{"id": 1, "attributes": {"url": "/uploads/shirt.jpg"}}]},
                    "category": {"data": {"id": 2, "attributes": {"name": "Tops", "slug": "tops"}}}
                }
            }],
            "meta": {"pagination": {"page": 1, "pageSize": 100, "pageCount": 1, "total": 1}}
        }"#;

        let collection: Collection<ProductAttributes> = serde_json::from_str(json).unwrap();
        let product = &collection.data[0];
        assert_eq!(product.id, 12);
        assert_eq!(product.attributes.price, Decimal::new(685, 1));
        assert_eq!(product.attributes.compare_at_price, Some(Decimal::new(8500, 2)));
        assert!(product.attributes.colors.is_none());
        assert_eq!(collection.meta.pagination.unwrap().total, 1);
    }

    #[test]
    fn test_deserialize_empty_relations() {
        let json = r#"{"id": 1, "attributes": {"name": "Tote", "slug": "tote", "price": 10,
            "images": {"data": null}, "category": {"data": null}}}"#;
        let entry: Entry<ProductAttributes> = serde_json::from_str(json).unwrap();
        assert!(entry.attributes.images.unwrap().data.is_none());
        assert!(entry.attributes.category.unwrap().data.is_none());
    }

    #[test]
    fn test_deserialize_error_envelope() {
        let json = r#"{"data": null, "error": {"status": 400, "name": "ValidationError",
            "message": "Invalid identifier or password", "details": {}}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error.status, 400);
        assert_eq!(envelope.error.message, "Invalid identifier or password");
    }
}
