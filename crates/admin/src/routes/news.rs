//! News article route handlers.

use std::cmp::Ordering;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::{ArticleId, FieldErrors};

use super::{format_date, format_datetime, render};
use crate::components::data_table::{
    DataTableConfig, FilterOption, Page, SortDir, TableColumn, TableQuery, TableRow,
};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::forms::ArticleForm;
use crate::middleware::AdminLayout;
use crate::models::NewsArticle;
use crate::services::flash;
use crate::state::AppState;
use crate::store::StoreError;

impl TableRow for NewsArticle {
    const SORT_COLUMNS: &'static [&'static str] = &["title", "published", "updated"];
    const DEFAULT_SORT: (&'static str, SortDir) = ("updated", SortDir::Desc);

    fn matches(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(term)
            || self.slug.contains(term)
            || self.summary.to_lowercase().contains(term)
    }

    fn compare(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "title" => self.title.to_lowercase().cmp(&other.title.to_lowercase()),
            "published" => self.published_on.cmp(&other.published_on),
            _ => self.updated_at.cmp(&other.updated_at),
        }
        .then_with(|| self.id.cmp(&other.id))
    }

    fn status(&self) -> Option<&str> {
        Some(if self.published { "published" } else { "draft" })
    }
}

/// Table configuration for the news listing.
#[must_use]
pub fn news_table_config() -> DataTableConfig {
    DataTableConfig::new("/news")
        .search_placeholder("Search articles...")
        .empty_title("No articles yet")
        .column(TableColumn::sortable("title", "Title"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::sortable("published", "Published"))
        .column(TableColumn::sortable("updated", "Updated"))
        .column(TableColumn::new("actions", ""))
        .status_option(FilterOption::new("published", "Published"))
        .status_option(FilterOption::new("draft", "Draft"))
}

/// Article row view for templates.
#[derive(Debug, Clone)]
pub struct ArticleRowView {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub published: bool,
    pub published_on: Option<String>,
    pub updated_at: String,
}

impl From<NewsArticle> for ArticleRowView {
    fn from(article: NewsArticle) -> Self {
        Self {
            id: article.id.as_i32(),
            published_on: article.published_on.map(format_date),
            updated_at: format_datetime(article.updated_at),
            title: article.title,
            slug: article.slug,
            published: article.published,
        }
    }
}

/// News list page template.
#[derive(Template)]
#[template(path = "news/index.html")]
pub struct NewsIndexTemplate {
    pub layout: AdminLayout,
    pub config: DataTableConfig,
    pub page: Page<ArticleRowView>,
}

/// Article create/edit form template.
#[derive(Template)]
#[template(path = "news/form.html")]
pub struct ArticleFormTemplate {
    pub layout: AdminLayout,
    /// `None` while creating.
    pub article_id: Option<i32>,
    pub form: ArticleForm,
    pub errors: FieldErrors,
}

impl ArticleFormTemplate {
    #[must_use]
    pub fn action(&self) -> String {
        self.article_id
            .map_or_else(|| "/news".to_string(), |id| format!("/news/{id}"))
    }
}

/// News list page handler.
#[instrument(skip_all)]
pub async fn index(
    layout: AdminLayout,
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Html<String>> {
    let config = news_table_config();
    let page = query
        .apply(&config, state.store().articles().await)
        .map(ArticleRowView::from);
    render(&NewsIndexTemplate {
        layout,
        config,
        page,
    })
}

/// New article form.
pub async fn new(layout: AdminLayout) -> Result<Html<String>> {
    render(&ArticleFormTemplate {
        layout,
        article_id: None,
        form: ArticleForm::default(),
        errors: FieldErrors::new(),
    })
}

/// Edit article form.
pub async fn edit(
    layout: AdminLayout,
    State(state): State<AppState>,
    Path(id): Path<ArticleId>,
) -> Result<Html<String>> {
    let article = state.store().article(id).await?;
    render(&ArticleFormTemplate {
        layout,
        article_id: Some(id.as_i32()),
        form: ArticleForm::from(&article),
        errors: FieldErrors::new(),
    })
}

/// Create an article.
#[instrument(skip(layout, state, session, form), fields(slug = %form.slug))]
pub async fn create(
    layout: AdminLayout,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ArticleForm>,
) -> Result<Response> {
    save(layout, &state, &session, None, form).await
}

/// Update an article.
#[instrument(skip(layout, state, session, form))]
pub async fn update(
    layout: AdminLayout,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ArticleId>,
    Form(form): Form<ArticleForm>,
) -> Result<Response> {
    state.store().article(id).await?;
    save(layout, &state, &session, Some(id), form).await
}

async fn save(
    layout: AdminLayout,
    state: &AppState,
    session: &Session,
    id: Option<ArticleId>,
    form: ArticleForm,
) -> Result<Response> {
    let store = state.store();
    let now = Utc::now();

    let result = match form.validate() {
        Ok(input) => {
            let saved = match id {
                Some(id) => store.update_article(id, input, now).await,
                None => store.create_article(input, now).await,
            };
            match saved {
                Ok(article) => Ok(article),
                Err(StoreError::DuplicateSlug(slug)) => {
                    let mut errors = FieldErrors::new();
                    errors.add("slug", format!("Another article already uses \"{slug}\""));
                    Err(errors)
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(errors) => Err(errors),
    };

    match result {
        Ok(article) => {
            let verb = if id.is_some() { "updated" } else { "created" };
            add_breadcrumb("news", verb, &[("slug", &article.slug)]);
            tracing::info!(article_id = article.id.as_i32(), published = article.published, "Article {verb}");
            flash::set(session, format!("Article \"{}\" {verb}", article.title)).await?;
            Ok(Redirect::to("/news").into_response())
        }
        Err(errors) => {
            let template = ArticleFormTemplate {
                layout,
                article_id: id.map(|id| id.as_i32()),
                form,
                errors,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&template)?).into_response())
        }
    }
}

/// Delete an article.
#[instrument(skip(_layout, state, session))]
pub async fn delete(
    _layout: AdminLayout,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ArticleId>,
) -> Result<Redirect> {
    let article = state.store().delete_article(id).await?;
    add_breadcrumb("news", "deleted", &[("slug", &article.slug)]);
    tracing::info!(article_id = id.as_i32(), "Article deleted");
    flash::set(&session, format!("Article \"{}\" deleted", article.title)).await?;
    Ok(Redirect::to("/news"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_news_table_filters_drafts() {
        let articles = crate::store::demo_data(Utc::now()).articles;
        let query = TableQuery {
            status: Some("draft".to_string()),
            ..TableQuery::default()
        };
        let page = query.apply(&news_table_config(), articles);
        assert_eq!(page.rows.len(), 1);
        assert!(page.rows.iter().all(|a| !a.published));
    }

    #[test]
    fn test_article_row_hides_missing_publication_date() {
        let draft = crate::store::demo_data(Utc::now())
            .articles
            .into_iter()
            .find(|a| !a.published)
            .unwrap();
        let row = ArticleRowView::from(draft);
        assert!(row.published_on.is_none());
        assert!(!row.published);
    }
}
