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
use crate::models::{Role, User};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub full_name: String,
    /// `AGENT` or `CUSTOMER`; defaults to `CUSTOMER`.
    pub role: Option<String>,
}

pub async fn create_user(
    State(services): State<Services>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(req) = body?;
    let role = match req.role.as_deref() {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|e| AppError::validation(e.to_string()))?,
        None => Role::default(),
    };

    let user = run_blocking(move || {
        services
            .users
            .create_user(&req.email, &req.full_name, role)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(State(services): State<Services>) -> Result<Json<Vec<User>>, AppError> {
    let users = run_blocking(move || services.users.list_users()).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(services): State<Services>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, AppError> {
    let Path(id) = id?;
    let user = run_blocking(move || services.users.get_user(id)).await?;
    Ok(Json(user))
}
