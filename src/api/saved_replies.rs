use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{run_blocking, AppError};
use crate::app::Services;
use crate::models::SavedReply;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSavedReplyRequest {
    pub title: String,
    pub body: String,
    pub created_by: Option<i64>,
}

pub async fn create_saved_reply(
    State(services): State<Services>,
    body: Result<Json<CreateSavedReplyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedReply>), AppError> {
    let Json(req) = body?;
    let reply = run_blocking(move || {
        services
            .saved_replies
            .create_saved_reply(&req.title, &req.body, req.created_by)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn list_saved_replies(
    State(services): State<Services>,
) -> Result<Json<Vec<SavedReply>>, AppError> {
    let replies = run_blocking(move || services.saved_replies.list_saved_replies()).await?;
    Ok(Json(replies))
}

pub async fn get_saved_reply(
    State(services): State<Services>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SavedReply>, AppError> {
    let Path(id) = id?;
    let reply = run_blocking(move || services.saved_replies.get_saved_reply(id)).await?;
    Ok(Json(reply))
}
