//! End-to-end tests for customer sign-in and the storefront's public
//! endpoints.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use boutique_integration_tests::spawn_storefront;

#[tokio::test]
async fn test_health_endpoints() {
    let server = spawn_storefront().await.unwrap();

    let live = server.get("/health").await.unwrap();
    assert_eq!(live.status(), StatusCode::OK);
    assert!(live.headers().contains_key("x-request-id"));
    assert_eq!(live.text().await.unwrap(), "ok");

    // The demo catalog is always ready
    let ready = server.get("/health/ready").await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_demo_customer_signs_in() {
    let server = spawn_storefront().await.unwrap();

    let response = server
        .post_form(
            "/auth/login",
            &[
                ("identifier", "demo@boutique.test"),
                ("password", "boutique-demo"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/");
    let body = response.text().await.unwrap();
    assert!(body.contains("Welcome back, Demo Customer"));
    assert!(body.contains("Hi, Demo Customer"));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let server = spawn_storefront().await.unwrap();

    let response = server
        .post_form(
            "/auth/login",
            &[
                ("identifier", "demo@boutique.test"),
                ("password", "not-the-password"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response.text().await.unwrap();
    // The identifier is kept for the retry
    assert!(body.contains("demo@boutique.test"));
    assert!(!body.contains("Hi, Demo Customer"));
}

#[tokio::test]
async fn test_signed_in_checkout_prefills_contact() {
    let server = spawn_storefront().await.unwrap();
    server
        .post_form(
            "/auth/login",
            &[
                ("identifier", "demo@boutique.test"),
                ("password", "boutique-demo"),
            ],
        )
        .await
        .unwrap();
    server
        .post_form(
            "/cart/add",
            &[("slug", "wool-beanie"), ("quantity", "1")],
        )
        .await
        .unwrap();
    server
        .post_form("/cart/toggle", &[("unique_id", "10--")])
        .await
        .unwrap();

    let body = server.get("/checkout").await.unwrap().text().await.unwrap();

    assert!(body.contains("value=\"Demo Customer\""));
    assert!(body.contains("value=\"demo@boutique.test\""));
}

#[tokio::test]
async fn test_logout_forgets_customer() {
    let server = spawn_storefront().await.unwrap();
    server
        .post_form(
            "/auth/login",
            &[
                ("identifier", "demo@boutique.test"),
                ("password", "boutique-demo"),
            ],
        )
        .await
        .unwrap();

    let response = server.post_form("/auth/logout", &[]).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.text().await.unwrap().contains("Hi, Demo Customer"));
}

#[tokio::test]
async fn test_catalog_pages_render() {
    let server = spawn_storefront().await.unwrap();

    let listing = server.get("/products?category=tops").await.unwrap();
    assert_eq!(listing.status(), StatusCode::OK);
    let body = listing.text().await.unwrap();
    assert!(body.contains("Organic Crew Tee"));
    assert!(!body.contains("Pleated Chino"));

    let detail = server.get("/products/merino-polo").await.unwrap();
    assert_eq!(detail.status(), StatusCode::OK);

    let missing = server.get("/products/no-such-product").await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
