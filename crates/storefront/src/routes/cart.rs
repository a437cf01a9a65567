//! Cart route handlers.
//!
//! The cart is a `CartState` stored in the visitor session. Every mutation
//! loads it, applies one operation and writes it back. Plain form posts get
//! a redirect; HTMX requests to `/cart/add` get the count badge fragment and
//! a `cart-updated` trigger instead.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Deserializer};
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::{CartError, CartItem, CartState, Variant};

use super::{format_price, is_htmx};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::PageContext;
use crate::services::{cart_store, flash};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub unique_id: String,
    pub name: String,
    pub variant: Option<String>,
    pub image: Option<String>,
    pub quantity: u32,
    pub max_quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub selected: bool,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub selected_total: String,
    pub item_count: u32,
    pub selected_count: usize,
    pub all_selected: bool,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub const fn has_selection(&self) -> bool {
        self.selected_count > 0
    }
}

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        Self {
            lines: cart
                .items()
                .iter()
                .map(|item| CartLineView {
                    unique_id: item.unique_id.clone(),
                    name: item.name.clone(),
                    variant: item.variant.label(),
                    image: item.image.clone(),
                    quantity: item.quantity,
                    max_quantity: item.quantity_ceiling(),
                    unit_price: format_price(item.unit_price),
                    line_total: format_price(item.line_total()),
                    selected: cart.is_selected(&item.unique_id),
                })
                .collect(),
            total: format_price(cart.total()),
            selected_total: format_price(cart.selected_total()),
            item_count: cart.item_count(),
            selected_count: cart.selected_items().count(),
            all_selected: cart.all_selected(),
        }
    }
}

/// Deserialize a blank number input as `None`.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Add to cart form data. A blank quantity adds one.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub slug: String,
    pub size: Option<String>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub quantity: Option<u32>,
}

/// Update quantity form data. A blank quantity leaves the line unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub unique_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub quantity: Option<i64>,
}

/// Single-line form data (remove, toggle).
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub unique_id: String,
}

/// Select-all form data.
#[derive(Debug, Deserialize)]
pub struct SelectAllForm {
    pub selected: bool,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: PageContext,
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(layout, session))]
pub async fn show(layout: PageContext, session: Session) -> impl IntoResponse {
    let cart = cart_store::load(&session).await;
    CartShowTemplate {
        layout,
        cart: CartView::from(&cart),
    }
}

/// Add a product variant to the cart.
///
/// The variant must be one the product offers. Adding a variant already in
/// the cart increases that line's quantity.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .product(&form.slug)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.slug)))?;
    let product_href = format!("/products/{}", product.slug);
    let htmx = is_htmx(&headers);

    let variant = Variant::new(form.size.as_deref(), form.color.as_deref());
    if !product.offers(&variant) {
        let message = "Please choose an available size and color";
        if htmx {
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, message).into_response());
        }
        flash::set(&session, message).await?;
        return Ok(Redirect::to(&product_href).into_response());
    }

    let item = CartItem::new(
        product.id,
        product.name.clone(),
        product.unit_price(),
        variant,
        form.quantity.unwrap_or(1),
        product.stock,
    )
    .with_image(product.featured_image().map(str::to_string));

    let mut cart = cart_store::load(&session).await;
    match cart.add_item(item) {
        Ok(quantity) => {
            cart_store::save(&session, &cart).await?;
            add_breadcrumb("cart", "Added to cart", &[("product", &product.slug)]);
            tracing::info!(product = %product.slug, quantity, "Added to cart");

            if htmx {
                return Ok((
                    AppendHeaders([("HX-Trigger", "cart-updated")]),
                    CartCountTemplate {
                        count: cart.item_count(),
                    },
                )
                    .into_response());
            }
            flash::set(&session, format!("Added {} to your cart", product.name)).await?;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(e) => {
            tracing::debug!(product = %product.slug, error = %e, "Add to cart rejected");
            if htmx {
                return Ok((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response());
            }
            flash::set(&session, add_error_message(&e)).await?;
            Ok(Redirect::to(&product_href).into_response())
        }
    }
}

fn add_error_message(error: &CartError) -> String {
    match error {
        CartError::OutOfStock(name) => format!("{name} is out of stock"),
        CartError::InvalidQuantity => "Quantity must be at least 1".to_string(),
        CartError::ItemNotFound(_) => "That item is no longer in your cart".to_string(),
    }
}

/// Set a line's quantity, clamped to `[1, stock]`.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Redirect> {
    let Some(requested) = form.quantity else {
        return Ok(Redirect::to("/cart"));
    };
    let mut cart = cart_store::load(&session).await;
    match cart.set_quantity(&form.unique_id, requested) {
        Ok(quantity) => {
            cart_store::save(&session, &cart).await?;
            if i64::from(quantity) != requested {
                flash::set(&session, format!("Quantity adjusted to {quantity}")).await?;
            }
        }
        Err(e) => {
            flash::set(&session, add_error_message(&e)).await?;
        }
    }
    Ok(Redirect::to("/cart"))
}

/// Remove a line (and its selection).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<LineForm>) -> Result<Redirect> {
    let mut cart = cart_store::load(&session).await;
    if let Some(item) = cart.remove_item(&form.unique_id) {
        cart_store::save(&session, &cart).await?;
        flash::set(&session, format!("Removed {}", item.name)).await?;
    }
    Ok(Redirect::to("/cart"))
}

/// Flip one line's selection.
#[instrument(skip(session))]
pub async fn toggle(session: Session, Form(form): Form<LineForm>) -> Result<Redirect> {
    let mut cart = cart_store::load(&session).await;
    cart.toggle_select(&form.unique_id);
    cart_store::save(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}

/// Replace the selection with the checked lines.
///
/// The form posts one `id` field per checked checkbox; any other field is
/// ignored.
#[instrument(skip(session, fields))]
pub async fn selection(
    session: Session,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Redirect> {
    let mut cart = cart_store::load(&session).await;
    cart.set_selection(
        fields
            .into_iter()
            .filter(|(key, _)| key == "id")
            .map(|(_, value)| value),
    );
    cart_store::save(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}

/// Select or deselect every line.
#[instrument(skip(session))]
pub async fn select_all(session: Session, Form(form): Form<SelectAllForm>) -> Result<Redirect> {
    let mut cart = cart_store::load(&session).await;
    cart.select_all(form.selected);
    cart_store::save(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Redirect> {
    let mut cart = cart_store::load(&session).await;
    cart.clear();
    cart_store::save(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: cart_store::load(&session).await.item_count(),
    }
}
