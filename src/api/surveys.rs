use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{run_blocking, AppError};
use crate::app::Services;
use crate::models::{SurveyStats, TicketSurvey};

/// Wire form of a survey.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyView {
    pub id: i64,
    pub ticket_id: i64,
    pub token: String,
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub is_submitted: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&TicketSurvey> for SurveyView {
    fn from(survey: &TicketSurvey) -> Self {
        Self {
            id: survey.id,
            ticket_id: survey.ticket_id,
            token: survey.token.clone(),
            rating: survey.rating(),
            comment: survey.comment().map(str::to_string),
            is_submitted: survey.is_submitted(),
            submitted_at: survey.submitted_at(),
            created_at: survey.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurveyRequest {
    pub ticket_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SubmitSurveyRequest {
    /// Wide integer so out-of-range values reach validation instead of
    /// failing deserialization.
    pub rating: i64,
    pub comment: Option<String>,
}

pub async fn create_survey(
    State(services): State<Services>,
    body: Result<Json<CreateSurveyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SurveyView>), AppError> {
    let Json(req) = body?;
    let survey = run_blocking(move || {
        let ticket = services.tickets.get_ticket(req.ticket_id)?;
        services.surveys.create_survey(&ticket)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(SurveyView::from(&survey))))
}

pub async fn get_survey(
    State(services): State<Services>,
    token: Result<Path<String>, PathRejection>,
) -> Result<Json<SurveyView>, AppError> {
    let Path(token) = token?;
    let survey = run_blocking(move || services.surveys.get_survey(&token)).await?;
    Ok(Json(SurveyView::from(&survey)))
}

pub async fn submit_survey(
    State(services): State<Services>,
    token: Result<Path<String>, PathRejection>,
    body: Result<Json<SubmitSurveyRequest>, JsonRejection>,
) -> Result<Json<SurveyView>, AppError> {
    let Path(token) = token?;
    let Json(req) = body?;
    let survey = run_blocking(move || {
        services
            .surveys
            .submit_survey(&token, req.rating, req.comment.as_deref())
    })
    .await?;
    Ok(Json(SurveyView::from(&survey)))
}

pub async fn stats(State(services): State<Services>) -> Result<Json<SurveyStats>, AppError> {
    let stats = run_blocking(move || services.surveys.stats()).await?;
    Ok(Json(stats))
}
