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
use crate::models::Department;

#[derive(Debug, Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_department(
    State(services): State<Services>,
    body: Result<Json<CreateDepartmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Department>), AppError> {
    let Json(req) = body?;
    let department = run_blocking(move || {
        services
            .departments
            .create_department(&req.name, req.description.as_deref())
    })
    .await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn list_departments(
    State(services): State<Services>,
) -> Result<Json<Vec<Department>>, AppError> {
    let departments = run_blocking(move || services.departments.list_departments()).await?;
    Ok(Json(departments))
}

pub async fn get_department(
    State(services): State<Services>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Department>, AppError> {
    let Path(id) = id?;
    let department = run_blocking(move || services.departments.get_department(id)).await?;
    Ok(Json(department))
}
