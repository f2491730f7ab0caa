use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{run_blocking, AppError};
use crate::app::Services;
use crate::models::{Article, ArticleFilter};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArticlesQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub include_drafts: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    /// Defaults to published.
    pub published: Option<bool>,
}

pub async fn list_articles(
    State(services): State<Services>,
    query: Result<Query<SearchArticlesQuery>, QueryRejection>,
) -> Result<Json<Vec<Article>>, AppError> {
    let Query(query) = query?;
    let filter = ArticleFilter {
        query: query.q,
        category: query.category,
        include_drafts: query.include_drafts,
    };
    let articles = run_blocking(move || services.knowledge_base.search(filter)).await?;
    Ok(Json(articles))
}

pub async fn create_article(
    State(services): State<Services>,
    body: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let Json(req) = body?;
    let article = run_blocking(move || {
        services.knowledge_base.create_article(
            &req.title,
            &req.body,
            req.category.as_deref(),
            req.published.unwrap_or(true),
        )
    })
    .await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn get_article(
    State(services): State<Services>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Article>, AppError> {
    let Path(id) = id?;
    let article = run_blocking(move || services.knowledge_base.get_article(id)).await?;
    Ok(Json(article))
}
