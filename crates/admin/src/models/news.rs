//! News articles shown on the shop blog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use boutique_core::ArticleId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: ArticleId,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    pub published: bool,
    /// Set the first time the article is published.
    pub published_on: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}
