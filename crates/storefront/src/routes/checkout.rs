//! Checkout route handlers.
//!
//! Checkout covers the selected cart lines only. A successful submission
//! stores the order summary in the session for the confirmation page and
//! clears the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::{CartState, FieldErrors};

use super::cart::{CartLineView, CartView};
use super::format_price;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, PageContext};
use crate::models::order::CheckoutForm;
use crate::models::{PlacedOrder, session_keys};
use crate::services::{cart_store, flash};

const EMPTY_SELECTION_NOTICE: &str = "Select at least one item to check out";

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub layout: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub form: CheckoutForm,
    pub errors: FieldErrors,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub layout: PageContext,
    pub order: PlacedOrder,
    pub lines: Vec<PlacedLineView>,
    pub total: String,
}

/// Purchased line display data for templates.
pub struct PlacedLineView {
    pub name: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub line_total: String,
}

fn checkout_page(
    layout: PageContext,
    cart: &CartState,
    form: CheckoutForm,
    errors: FieldErrors,
) -> CheckoutTemplate {
    let view = CartView::from(cart);
    CheckoutTemplate {
        layout,
        lines: view.lines.into_iter().filter(|l| l.selected).collect(),
        total: view.selected_total,
        form,
        errors,
    }
}

/// Display the checkout form for the current selection.
#[instrument(skip(layout, session, customer))]
pub async fn show(
    layout: PageContext,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Response> {
    let cart = cart_store::load(&session).await;
    if !cart.has_selection() {
        flash::set(&session, EMPTY_SELECTION_NOTICE).await?;
        return Ok(Redirect::to("/cart").into_response());
    }

    let form = customer.map_or_else(CheckoutForm::default, |c| CheckoutForm {
        full_name: c.username,
        email: c.email,
        ..CheckoutForm::default()
    });
    Ok(checkout_page(layout, &cart, form, FieldErrors::new()).into_response())
}

/// Validate the form and place the order.
#[instrument(skip(layout, session, form))]
pub async fn submit(
    layout: PageContext,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = cart_store::load(&session).await;
    if !cart.has_selection() {
        flash::set(&session, EMPTY_SELECTION_NOTICE).await?;
        return Ok(Redirect::to("/cart").into_response());
    }

    let contact = match form.validate() {
        Ok(contact) => contact,
        Err(errors) => {
            tracing::debug!(fields = errors.len(), "Checkout form rejected");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                checkout_page(layout, &cart, form, errors),
            )
                .into_response());
        }
    };

    let Some(order) = PlacedOrder::from_selection(&cart, contact) else {
        return Ok(Redirect::to("/cart").into_response());
    };

    session.insert(session_keys::LAST_ORDER, &order).await?;
    cart.clear();
    cart_store::save(&session, &cart).await?;

    add_breadcrumb("checkout", "Order placed", &[("order", &order.number)]);
    tracing::info!(
        order = %order.number,
        lines = order.lines.len(),
        total = %order.total,
        "Order placed"
    );

    Ok(Redirect::to("/checkout/success").into_response())
}

/// Display the confirmation for the last placed order.
#[instrument(skip(layout, session))]
pub async fn success(layout: PageContext, session: Session) -> Result<Response> {
    let Some(order) = session.get::<PlacedOrder>(session_keys::LAST_ORDER).await? else {
        return Ok(Redirect::to("/").into_response());
    };
    let lines = order
        .lines
        .iter()
        .map(|line| PlacedLineView {
            name: line.name.clone(),
            variant: line.variant.clone(),
            quantity: line.quantity,
            line_total: format_price(line.line_total),
        })
        .collect();
    let total = format_price(order.total);
    Ok(CheckoutSuccessTemplate {
        layout,
        order,
        lines,
        total,
    }
    .into_response())
}
