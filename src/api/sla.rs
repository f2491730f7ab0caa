use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Deserialize;

use super::{run_blocking, AppError};
use crate::app::Services;
use crate::models::{SlaConfig, SlaStatus};
use crate::tickets::parse_priority;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSlaConfigRequest {
    pub priority: String,
    pub first_response_minutes: i64,
    pub resolution_minutes: i64,
}

/// Upsert: one config per priority, so a repeat POST replaces the targets.
pub async fn set_config(
    State(services): State<Services>,
    body: Result<Json<SetSlaConfigRequest>, JsonRejection>,
) -> Result<Json<SlaConfig>, AppError> {
    let Json(req) = body?;
    let priority = parse_priority(&req.priority)?;
    let config = run_blocking(move || {
        services
            .sla
            .set_config(priority, req.first_response_minutes, req.resolution_minutes)
    })
    .await?;
    Ok(Json(config))
}

pub async fn list_configs(
    State(services): State<Services>,
) -> Result<Json<Vec<SlaConfig>>, AppError> {
    let configs = run_blocking(move || services.sla.list_configs()).await?;
    Ok(Json(configs))
}

pub async fn get_config(
    State(services): State<Services>,
    priority: Result<Path<String>, PathRejection>,
) -> Result<Json<SlaConfig>, AppError> {
    let Path(priority) = priority?;
    let priority = parse_priority(&priority)?;
    let config = run_blocking(move || services.sla.get_config(priority)).await?;
    Ok(Json(config))
}

pub async fn ticket_status(
    State(services): State<Services>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SlaStatus>, AppError> {
    let Path(id) = id?;
    let status = run_blocking(move || services.sla.ticket_status(id)).await?;
    Ok(Json(status))
}
