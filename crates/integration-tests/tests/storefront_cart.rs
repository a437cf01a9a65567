//! End-to-end tests for the storefront cart, selection and checkout.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use boutique_integration_tests::{TestServer, spawn_storefront};

const TEE: &str = "organic-crew-tee";

async fn add(server: &TestServer, slug: &str, size: &str, color: &str, quantity: &str) {
    let response = server
        .post_form(
            "/cart/add",
            &[
                ("slug", slug),
                ("size", size),
                ("color", color),
                ("quantity", quantity),
            ],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn cart_count(server: &TestServer) -> String {
    server.get("/cart/count").await.unwrap().text().await.unwrap()
}

async fn cart_page(server: &TestServer) -> String {
    server.get("/cart").await.unwrap().text().await.unwrap()
}

#[tokio::test]
async fn test_adding_same_variant_merges_lines() {
    let server = spawn_storefront().await.unwrap();

    add(&server, TEE, "M", "Black", "2").await;
    add(&server, TEE, "M", "Black", "1").await;

    assert!(cart_count(&server).await.contains(">3<"));
    let page = cart_page(&server).await;
    assert_eq!(page.matches("value=\"2-M-Black\"").count(), 3);
}

#[tokio::test]
async fn test_distinct_variants_are_separate_lines() {
    let server = spawn_storefront().await.unwrap();

    add(&server, TEE, "M", "Black", "1").await;
    add(&server, TEE, "L", "Black", "1").await;

    let page = cart_page(&server).await;
    assert!(page.contains("2-M-Black"));
    assert!(page.contains("2-L-Black"));
    assert!(cart_count(&server).await.contains(">2<"));
}

#[tokio::test]
async fn test_add_redirects_to_cart() {
    let server = spawn_storefront().await.unwrap();

    let response = server
        .post_form(
            "/cart/add",
            &[("slug", TEE), ("size", "S"), ("color", "White")],
        )
        .await
        .unwrap();

    assert_eq!(response.url().path(), "/cart");
    let body = response.text().await.unwrap();
    assert!(body.contains("Added Organic Crew Tee to your cart"));
}

#[tokio::test]
async fn test_unavailable_variant_is_rejected() {
    let server = spawn_storefront().await.unwrap();

    let response = server
        .post_form(
            "/cart/add",
            &[("slug", TEE), ("size", "XXL"), ("color", "Black")],
        )
        .await
        .unwrap();

    assert_eq!(response.url().path(), "/products/organic-crew-tee");
    assert!(cart_count(&server).await.contains(">0<"));
}

#[tokio::test]
async fn test_sold_out_product_is_rejected() {
    let server = spawn_storefront().await.unwrap();

    let response = server
        .post_form(
            "/cart/add",
            &[("slug", "drawstring-short"), ("size", "M"), ("color", "Sand")],
        )
        .await
        .unwrap();

    assert_eq!(response.url().path(), "/products/drawstring-short");
    assert!(response.text().await.unwrap().contains("out of stock"));
    assert!(cart_count(&server).await.contains(">0<"));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let server = spawn_storefront().await.unwrap();

    let response = server
        .post_form("/cart/add", &[("slug", "no-such-product")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_clamps_to_stock() {
    let server = spawn_storefront().await.unwrap();
    // Merino Polo has 4 in stock
    add(&server, "merino-polo", "M", "Navy", "1").await;

    let response = server
        .post_form("/cart/update", &[("unique_id", "3-M-Navy"), ("quantity", "10")])
        .await
        .unwrap();

    assert!(response.text().await.unwrap().contains("Quantity adjusted to 4"));
    assert!(cart_count(&server).await.contains(">4<"));
}

#[tokio::test]
async fn test_remove_line() {
    let server = spawn_storefront().await.unwrap();
    add(&server, TEE, "M", "Black", "1").await;
    add(&server, "canvas-tote", "", "Natural", "1").await;

    server
        .post_form("/cart/remove", &[("unique_id", "2-M-Black")])
        .await
        .unwrap();

    let page = cart_page(&server).await;
    assert!(!page.contains("2-M-Black"));
    assert!(page.contains("9--Natural"));
    assert!(cart_count(&server).await.contains(">1<"));
}

#[tokio::test]
async fn test_clear_empties_cart() {
    let server = spawn_storefront().await.unwrap();
    add(&server, TEE, "M", "Black", "2").await;

    server.post_form("/cart/clear", &[]).await.unwrap();

    assert!(cart_page(&server).await.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_checkout_requires_a_selection() {
    let server = spawn_storefront().await.unwrap();
    add(&server, TEE, "M", "Black", "1").await;

    server
        .post_form("/cart/select-all", &[("selected", "false")])
        .await
        .unwrap();
    let response = server.get("/checkout").await.unwrap();

    assert_eq!(response.url().path(), "/cart");
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Select at least one item to check out")
    );
}

#[tokio::test]
async fn test_checkout_validation_errors() {
    let server = spawn_storefront().await.unwrap();
    add(&server, TEE, "M", "Black", "1").await;
    server
        .post_form("/cart/select-all", &[("selected", "true")])
        .await
        .unwrap();

    let response = server
        .post_form(
            "/checkout",
            &[("full_name", ""), ("email", "not-an-email"), ("phone", "12")],
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("Please enter your full name"));
    assert!(body.contains("Phone numbers need 8 to 15 digits"));
    assert!(body.contains("Please enter a delivery address"));
    // Nothing was bought
    assert!(cart_count(&server).await.contains(">1<"));
}

#[tokio::test]
async fn test_checkout_buys_only_selected_lines() {
    let server = spawn_storefront().await.unwrap();
    add(&server, TEE, "M", "Black", "2").await;
    add(&server, "canvas-tote", "", "Natural", "1").await;

    // Replace the selection: only the tee
    server
        .post_form("/cart/selection", &[("id", "2-M-Black")])
        .await
        .unwrap();
    let checkout = server.get("/checkout").await.unwrap().text().await.unwrap();
    assert!(checkout.contains("Organic Crew Tee"));
    assert!(!checkout.contains("Canvas Tote"));

    let response = server
        .post_form(
            "/checkout",
            &[
                ("full_name", "Ada Lovelace"),
                ("email", "ada@example.com"),
                ("phone", "+44 20 7946 0958"),
                ("address", "12 St James's Square, London"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.url().path(), "/checkout/success");
    let body = response.text().await.unwrap();
    assert!(body.contains("Thank you, Ada Lovelace"));
    assert!(body.contains("Organic Crew Tee"));
    assert!(!body.contains("Canvas Tote"));

    // Placing the order empties the cart
    assert!(cart_count(&server).await.contains(">0<"));
}

#[tokio::test]
async fn test_selection_ignores_unknown_ids() {
    let server = spawn_storefront().await.unwrap();
    add(&server, TEE, "M", "Black", "1").await;

    server
        .post_form("/cart/selection", &[("id", "99-X-Nope")])
        .await
        .unwrap();
    let response = server.get("/checkout").await.unwrap();

    assert_eq!(response.url().path(), "/cart");
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let first = spawn_storefront().await.unwrap();
    add(&first, TEE, "M", "Black", "1").await;

    let second = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();
    let body = second
        .get(first.url("/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains(">0<"));
}

#[tokio::test]
async fn test_blank_quantity_on_add_adds_one() {
    let server = spawn_storefront().await.unwrap();

    add(&server, TEE, "M", "Black", "").await;

    assert!(cart_count(&server).await.contains(">1<"));
}

#[tokio::test]
async fn test_blank_quantity_on_update_changes_nothing() {
    let server = spawn_storefront().await.unwrap();
    add(&server, TEE, "M", "Black", "2").await;

    let response = server
        .post_form("/cart/update", &[("unique_id", "2-M-Black"), ("quantity", "")])
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/cart");
    assert!(cart_count(&server).await.contains(">2<"));
}
