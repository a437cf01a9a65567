//! A stand-in headless CMS serving the REST shapes the storefront reads.
//!
//! Every request is recorded so tests can check what the storefront sent.
//! A stub started unhealthy answers everything with a 503 error envelope.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::{HarnessError, TestServer};

/// Bearer token the storefront is configured with.
pub const CMS_API_TOKEN: &str = "stub-cms-token";

/// The one account the stub knows.
pub const CMS_EMAIL: &str = "ada@cms.test";
pub const CMS_USERNAME: &str = "Ada";
pub const CMS_PASSWORD: &str = "analytical-engine";

/// A request the stub received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    /// Value of a query parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct StubState {
    healthy: bool,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubState {
    async fn record(&self, path: &str, query: Vec<(String, String)>, headers: &HeaderMap) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().await.push(RecordedRequest {
            path: path.to_string(),
            query,
            authorization,
        });
    }
}

/// A running stub CMS.
pub struct StubCms {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubCms {
    /// Start a stub that serves its catalog and account.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound.
    pub async fn healthy() -> Result<Self, HarnessError> {
        Self::start(true).await
    }

    /// Start a stub that answers every request with 503.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound.
    pub async fn failing() -> Result<Self, HarnessError> {
        Self::start(false).await
    }

    async fn start(healthy: bool) -> Result<Self, HarnessError> {
        let state = Arc::new(StubState {
            healthy,
            requests: Mutex::new(Vec::new()),
        });
        let router = Router::new()
            .route("/api/products", get(products))
            .route("/api/categories", get(categories))
            .route("/api/auth/local", post(login))
            .route("/api/auth/local/register", post(register))
            .with_state(Arc::clone(&state));
        let server = TestServer::start(router).await?;
        Ok(Self {
            base_url: server.base_url,
            state,
        })
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }
}

fn error_envelope(status: StatusCode, name: &str, message: &str) -> Response {
    let body = json!({
        "data": null,
        "error": {
            "status": status.as_u16(),
            "name": name,
            "message": message,
            "details": {}
        }
    });
    (status, Json(body)).into_response()
}

fn outage() -> Response {
    error_envelope(
        StatusCode::SERVICE_UNAVAILABLE,
        "ServiceUnavailableError",
        "Service Unavailable",
    )
}

fn category(id: i32, name: &str, slug: &str) -> Value {
    json!({ "id": id, "attributes": { "name": name, "slug": slug } })
}

fn catalog() -> Vec<Value> {
    vec![
        json!({
            "id": 41,
            "attributes": {
                "name": "Selvedge Denim Jacket",
                "slug": "selvedge-denim-jacket",
                "description": "Raw denim, cut boxy.",
                "price": "189.00",
                "stock": 5,
                "sizes": ["M", "L"],
                "colors": ["Indigo"],
                "featured": true,
                "publishedAt": "2026-09-01T09:00:00.000Z",
                "images": { "data": null },
                "category": { "data": category(1, "Outerwear", "outerwear") }
            }
        }),
        json!({
            "id": 42,
            "attributes": {
                "name": "Chambray Overshirt",
                "slug": "chambray-overshirt",
                "price": "74.50",
                "stock": 9,
                "sizes": ["S", "M", "L"],
                "colors": null,
                "publishedAt": "2026-08-15T09:00:00.000Z",
                "images": { "data": [{ "id": 7, "attributes": { "url": "/uploads/overshirt.jpg" } }] },
                "category": { "data": category(2, "Tops", "tops") }
            }
        }),
    ]
}

fn collection(data: Vec<Value>) -> Response {
    let total = data.len();
    Json(json!({
        "data": data,
        "meta": { "pagination": { "page": 1, "pageSize": 100, "pageCount": 1, "total": total } }
    }))
    .into_response()
}

async fn products(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    state.record("/api/products", query.clone(), &headers).await;
    if !state.healthy {
        return outage();
    }

    let param = |key: &str| {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    let slug = param("filters[slug][$eq]");
    let category_slug = param("filters[category][slug][$eq]");

    let matching = catalog()
        .into_iter()
        .filter(|p| {
            slug.as_deref()
                .is_none_or(|s| p["attributes"]["slug"] == s)
        })
        .filter(|p| {
            category_slug
                .as_deref()
                .is_none_or(|s| p["attributes"]["category"]["data"]["attributes"]["slug"] == s)
        })
        .collect();
    collection(matching)
}

async fn categories(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    state.record("/api/categories", query, &headers).await;
    if !state.healthy {
        return outage();
    }
    collection(vec![
        category(1, "Outerwear", "outerwear"),
        category(2, "Tops", "tops"),
    ])
}

fn auth_response(id: i32, username: &str, email: &str) -> Response {
    Json(json!({
        "jwt": format!("stub-jwt-{id}"),
        "user": { "id": id, "username": username, "email": email }
    }))
    .into_response()
}

async fn login(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("/api/auth/local", Vec::new(), &headers).await;
    if !state.healthy {
        return outage();
    }
    if body["identifier"] == CMS_EMAIL && body["password"] == CMS_PASSWORD {
        return auth_response(7, CMS_USERNAME, CMS_EMAIL);
    }
    error_envelope(
        StatusCode::BAD_REQUEST,
        "ValidationError",
        "Invalid identifier or password",
    )
}

async fn register(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("/api/auth/local/register", Vec::new(), &headers).await;
    if !state.healthy {
        return outage();
    }
    let (Some(username), Some(email)) = (body["username"].as_str(), body["email"].as_str()) else {
        return error_envelope(StatusCode::BAD_REQUEST, "ValidationError", "Missing fields");
    };
    if email.eq_ignore_ascii_case(CMS_EMAIL) {
        return error_envelope(
            StatusCode::BAD_REQUEST,
            "ApplicationError",
            "Email or Username are already taken",
        );
    }
    auth_response(8, username, email)
}
