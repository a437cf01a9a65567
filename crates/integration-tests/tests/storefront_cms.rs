//! End-to-end tests for the storefront backed by a headless CMS.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use boutique_integration_tests::cms_stub::{
    CMS_API_TOKEN, CMS_EMAIL, CMS_PASSWORD, RecordedRequest, StubCms,
};
use boutique_integration_tests::{TestServer, spawn_cms_storefront};

/// Nothing listens on port 1.
const UNREACHABLE_CMS: &str = "http://127.0.0.1:1/";

const UNAVAILABLE: &str = "Sign-in is temporarily unavailable, please try again";

fn requests_to<'a>(requests: &'a [RecordedRequest], path: &str) -> Vec<&'a RecordedRequest> {
    requests.iter().filter(|r| r.path == path).collect()
}

async fn login(server: &TestServer, identifier: &str, password: &str) -> reqwest::Response {
    server
        .post_form(
            "/auth/login",
            &[("identifier", identifier), ("password", password)],
        )
        .await
        .unwrap()
}

async fn register(server: &TestServer, username: &str, email: &str) -> reqwest::Response {
    server
        .post_form(
            "/auth/register",
            &[
                ("username", username),
                ("email", email),
                ("password", "hopper-1906"),
                ("password_confirm", "hopper-1906"),
            ],
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_listing_filters_by_category_with_token() {
    let cms = StubCms::healthy().await.unwrap();
    let server = spawn_cms_storefront(&cms.base_url).await.unwrap();

    let response = server.get("/products?category=outerwear").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Selvedge Denim Jacket"));
    assert!(!body.contains("Chambray Overshirt"));

    let requests = cms.requests().await;
    let listing = requests_to(&requests, "/api/products")
        .into_iter()
        .find(|r| r.param("filters[category][slug][$eq]") == Some("outerwear"))
        .unwrap();
    assert_eq!(listing.param("populate"), Some("*"));
    assert_eq!(listing.param("sort"), Some("publishedAt:desc"));
    assert!(!requests_to(&requests, "/api/categories").is_empty());

    let expected = format!("Bearer {CMS_API_TOKEN}");
    assert!(
        requests
            .iter()
            .all(|r| r.authorization.as_deref() == Some(expected.as_str()))
    );
}

#[tokio::test]
async fn test_product_detail_is_looked_up_by_slug() {
    let cms = StubCms::healthy().await.unwrap();
    let server = spawn_cms_storefront(&cms.base_url).await.unwrap();

    let response = server.get("/products/chambray-overshirt").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Chambray Overshirt"));

    let requests = cms.requests().await;
    assert!(
        requests_to(&requests, "/api/products")
            .iter()
            .any(|r| r.param("filters[slug][$eq]") == Some("chambray-overshirt"))
    );

    let missing = server.get("/products/no-such-product").await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cms_outage_renders_empty_catalog() {
    let cms = StubCms::failing().await.unwrap();
    let server = spawn_cms_storefront(&cms.base_url).await.unwrap();

    let listing = server.get("/products").await.unwrap();
    assert_eq!(listing.status(), StatusCode::OK);
    assert!(
        listing
            .text()
            .await
            .unwrap()
            .contains("No products match your filters")
    );

    let detail = server.get("/products/selvedge-denim-jacket").await.unwrap();
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);

    assert_eq!(server.get("/health").await.unwrap().status(), StatusCode::OK);
    assert_eq!(
        server.get("/health/ready").await.unwrap().status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_healthy_cms_is_ready() {
    let cms = StubCms::healthy().await.unwrap();
    let server = spawn_cms_storefront(&cms.base_url).await.unwrap();

    let ready = server.get("/health/ready").await.unwrap();

    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cms_customer_signs_in() {
    let cms = StubCms::healthy().await.unwrap();
    let server = spawn_cms_storefront(&cms.base_url).await.unwrap();

    let response = login(&server, CMS_EMAIL, CMS_PASSWORD).await;

    assert_eq!(response.url().path(), "/");
    let body = response.text().await.unwrap();
    assert!(body.contains("Welcome back, Ada"));
    assert!(body.contains("Hi, Ada"));
    assert_eq!(
        requests_to(&cms.requests().await, "/api/auth/local").len(),
        1
    );
}

#[tokio::test]
async fn test_cms_rejection_message_is_shown() {
    let cms = StubCms::healthy().await.unwrap();
    let server = spawn_cms_storefront(&cms.base_url).await.unwrap();

    let response = login(&server, CMS_EMAIL, "not-the-password").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response.text().await.unwrap();
    // Message decoded from the CMS error envelope
    assert!(body.contains("Invalid identifier or password"));
    assert!(body.contains("<form"));
}

#[tokio::test]
async fn test_cms_registration() {
    let cms = StubCms::healthy().await.unwrap();
    let server = spawn_cms_storefront(&cms.base_url).await.unwrap();

    let taken = register(&server, "Ada Again", CMS_EMAIL).await;
    assert_eq!(taken.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        taken
            .text()
            .await
            .unwrap()
            .contains("Email or Username are already taken")
    );

    let created = register(&server, "Grace", "grace@cms.test").await;
    assert_eq!(created.url().path(), "/");
    assert!(created.text().await.unwrap().contains("Welcome, Grace"));
    assert_eq!(
        requests_to(&cms.requests().await, "/api/auth/local/register").len(),
        2
    );
}

#[tokio::test]
async fn test_unreachable_cms_keeps_login_form() {
    let server = spawn_cms_storefront(UNREACHABLE_CMS).await.unwrap();

    let response = login(&server, "a@b.test", "whatever1").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = response.text().await.unwrap();
    assert!(body.contains("<form"));
    assert!(body.contains(UNAVAILABLE));
    // The identifier is kept for the retry
    assert!(body.contains("a@b.test"));
}

#[tokio::test]
async fn test_unreachable_cms_keeps_register_form() {
    let server = spawn_cms_storefront(UNREACHABLE_CMS).await.unwrap();

    let response = register(&server, "Grace", "grace@cms.test").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = response.text().await.unwrap();
    assert!(body.contains("<form"));
    assert!(body.contains(UNAVAILABLE));
}

#[tokio::test]
async fn test_failing_cms_login_is_shown_inline() {
    let cms = StubCms::failing().await.unwrap();
    let server = spawn_cms_storefront(&cms.base_url).await.unwrap();

    let response = login(&server, CMS_EMAIL, CMS_PASSWORD).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.text().await.unwrap().contains(UNAVAILABLE));
}
