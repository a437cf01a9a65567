//! Headless CMS REST client.
//!
//! # Architecture
//!
//! - The CMS is the source of truth for products, categories and customer
//!   accounts; nothing is synced locally
//! - Catalog reads are cached in-memory via `moka` (TTL from `CMS_CACHE_TTL_SECS`)
//! - Auth calls (`/auth/local`, `/auth/local/register`) are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use boutique_storefront::cms::CmsClient;
//!
//! let client = CmsClient::new(&cms_config)?;
//! let shirts = client.products(Some("tops")).await?;
//! let shirt = client.product_by_slug("linen-camp-shirt").await?;
//! ```

mod conversions;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use boutique_core::{Category, Product};

use crate::config::CmsConfig;
use conversions::{convert_category, convert_product};
use types::{
    AuthResponse, CategoryAttributes, CmsUser, Collection, ErrorEnvelope, LoginRequest,
    ProductAttributes, RegisterRequest,
};

/// Largest page the CMS will return in one request.
const PAGE_SIZE: u32 = 100;

/// Errors that can occur when talking to the CMS.
#[derive(Debug, Error)]
pub enum CmsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The CMS answered with a non-success status.
    #[error("CMS returned {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot host the API.
    #[error("Invalid CMS URL: {0}")]
    Url(#[from] url::ParseError),
}

impl CmsError {
    /// Whether the CMS rejected the request itself (bad credentials,
    /// validation failure) rather than failing to serve it.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 400 && *status < 500)
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products { category: Option<String> },
    Product(String),
    Categories,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
    Categories(Arc<Vec<Category>>),
}

/// An authenticated CMS user and their API token.
#[derive(Clone)]
pub struct CmsSession {
    pub jwt: SecretString,
    pub user: CmsUser,
}

/// Client for the CMS REST API.
#[derive(Clone)]
pub struct CmsClient {
    inner: Arc<CmsClientInner>,
}

struct CmsClientInner {
    client: reqwest::Client,
    api_base: Url,
    media_base: Url,
    api_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl CmsClient {
    /// Create a new CMS client.
    ///
    /// # Errors
    ///
    /// Returns `CmsError::Url` if the API base cannot be derived from the
    /// configured URL.
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let mut media_base = config.base_url.clone();
        if !media_base.path().ends_with('/') {
            let path = format!("{}/", media_base.path());
            media_base.set_path(&path);
        }
        let api_base = media_base.join("api/")?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CmsClientInner {
                client: reqwest::Client::new(),
                api_base,
                media_base,
                api_token: config.api_token.clone(),
                cache,
            }),
        })
    }

    /// Base URL the REST API is served from.
    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.inner.api_base
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CmsError> {
        let mut url = self.inner.api_base.join(path)?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));

        let mut request = self.inner.client.get(url);
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CmsError> {
        let url = self.inner.api_base.join(path)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CmsError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body).map_or_else(
                |_| body.chars().take(200).collect::<String>(),
                |envelope| envelope.error.message,
            );
            if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                tracing::error!(status = %status, message = %message, "CMS returned non-success status");
            }
            return Err(CmsError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse CMS response"
            );
            CmsError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List published products, newest first, optionally within a category.
    #[instrument(skip(self))]
    pub async fn products(&self, category: Option<&str>) -> Result<Arc<Vec<Product>>, CmsError> {
        let key = CacheKey::Products {
            category: category.map(str::to_string),
        };
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut query = vec![
            ("populate", "*".to_string()),
            ("sort", "publishedAt:desc".to_string()),
            ("pagination[pageSize]", PAGE_SIZE.to_string()),
        ];
        if let Some(slug) = category {
            query.push(("filters[category][slug][$eq]", slug.to_string()));
        }

        let collection: Collection<ProductAttributes> = self.get_json("products", &query).await?;
        if let Some(pagination) = &collection.meta.pagination
            && pagination.total > pagination.page_size
        {
            tracing::warn!(
                total = pagination.total,
                page_size = pagination.page_size,
                "CMS product list truncated to first page"
            );
        }

        let products: Arc<Vec<Product>> = Arc::new(
            collection
                .data
                .into_iter()
                .map(|entry| convert_product(entry, &self.inner.media_base))
                .collect(),
        );

        self.inner
            .cache
            .insert(key, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Fetch one product by slug.
    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, CmsError> {
        let key = CacheKey::Product(slug.to_string());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let query = [
            ("populate", "*".to_string()),
            ("filters[slug][$eq]", slug.to_string()),
        ];
        let collection: Collection<ProductAttributes> = self.get_json("products", &query).await?;

        let Some(entry) = collection.data.into_iter().next() else {
            return Ok(None);
        };
        let product = convert_product(entry, &self.inner.media_base);

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(Some(product))
    }

    /// List all categories.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, CmsError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let query = [("sort", "name:asc".to_string())];
        let collection: Collection<CategoryAttributes> =
            self.get_json("categories", &query).await?;
        let categories: Arc<Vec<Category>> =
            Arc::new(collection.data.into_iter().map(convert_category).collect());

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    // =========================================================================
    // Customer auth (not cached)
    // =========================================================================

    /// Sign in with an email or username.
    #[instrument(skip(self, password))]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<CmsSession, CmsError> {
        let response: AuthResponse = self
            .post_json("auth/local", &LoginRequest { identifier, password })
            .await?;
        Ok(CmsSession {
            jwt: SecretString::from(response.jwt),
            user: response.user,
        })
    }

    /// Create a customer account.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<CmsSession, CmsError> {
        let response: AuthResponse = self
            .post_json(
                "auth/local/register",
                &RegisterRequest {
                    username,
                    email,
                    password,
                },
            )
            .await?;
        Ok(CmsSession {
            jwt: SecretString::from(response.jwt),
            user: response.user,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(url: &str) -> CmsConfig {
        CmsConfig {
            base_url: Url::parse(url).unwrap(),
            api_token: None,
            cache_ttl: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_api_base_from_root_url() {
        let client = CmsClient::new(&config("https://cms.boutique.test")).unwrap();
        assert_eq!(client.api_base().as_str(), "https://cms.boutique.test/api/");
    }

    #[test]
    fn test_api_base_keeps_path_prefix() {
        let client = CmsClient::new(&config("https://boutique.test/cms")).unwrap();
        assert_eq!(client.api_base().as_str(), "https://boutique.test/cms/api/");
    }

    #[test]
    fn test_rejection_is_client_error_only() {
        let rejected = CmsError::Status {
            status: 400,
            message: "Invalid identifier or password".to_string(),
        };
        let failed = CmsError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(rejected.is_rejection());
        assert!(!failed.is_rejection());
    }
}
