//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use boutique_core::Category;

use super::products::ProductView;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: PageContext,
    /// Featured products grid.
    pub featured: Vec<ProductView>,
    /// Category shortcuts.
    pub categories: Vec<Category>,
}

/// Display the home page.
#[instrument(skip(state, layout))]
pub async fn home(State(state): State<AppState>, layout: PageContext) -> impl IntoResponse {
    let featured = state
        .catalog()
        .featured()
        .await
        .iter()
        .map(ProductView::from)
        .collect();
    let categories = state.catalog().categories().await;

    HomeTemplate {
        layout,
        featured,
        categories,
    }
}
