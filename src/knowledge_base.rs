//! Knowledge-base articles customers can search before opening a ticket.

use std::sync::Arc;
use tracing::info;

use crate::error::{HelpdeskError, Result};
use crate::models::{Article, ArticleFilter, NewArticle};
use crate::store::ArticleStore;

pub const MAX_TITLE_CHARS: usize = 200;

#[derive(Clone)]
pub struct KnowledgeBaseService {
    store: Arc<dyn ArticleStore>,
}

impl KnowledgeBaseService {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    pub fn create_article(
        &self,
        title: &str,
        body: &str,
        category: Option<&str>,
        published: bool,
    ) -> Result<Article> {
        let title = title.trim();
        if title.is_empty() {
            return Err(HelpdeskError::validation("Title must not be empty"));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(HelpdeskError::validation(format!(
                "Title must be at most {} characters",
                MAX_TITLE_CHARS
            )));
        }
        if body.trim().is_empty() {
            return Err(HelpdeskError::validation("Article body must not be empty"));
        }

        let article = self.store.create_article(&NewArticle {
            title: title.to_string(),
            body: body.to_string(),
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            published,
        })?;
        info!(article_id = article.id, published, "Created article");
        Ok(article)
    }

    pub fn get_article(&self, id: i64) -> Result<Article> {
        self.store
            .get_article(id)?
            .ok_or_else(|| HelpdeskError::not_found("Article", id))
    }

    /// Blank query and category strings are treated as absent.
    pub fn search(&self, filter: ArticleFilter) -> Result<Vec<Article>> {
        let filter = ArticleFilter {
            query: non_blank(filter.query),
            category: non_blank(filter.category),
            include_drafts: filter.include_drafts,
        };
        Ok(self.store.list_articles(&filter)?)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
