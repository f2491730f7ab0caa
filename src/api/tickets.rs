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
use crate::models::{Ticket, TicketFilter, TicketMessage};
use crate::tickets::{parse_priority, parse_status};

/// Filters for `GET /tickets`. Values are parsed leniently (case and `-`
/// insensitive) and rejected with 422 when unknown.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTicketsQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub user_id: Option<i64>,
}

impl ListTicketsQuery {
    fn into_filter(self) -> Result<TicketFilter, AppError> {
        Ok(TicketFilter {
            status: self.status.as_deref().map(parse_status).transpose()?,
            priority: self.priority.as_deref().map(parse_priority).transpose()?,
            user_id: self.user_id,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMessageRequest {
    pub body: String,
    pub author_id: Option<i64>,
}

pub async fn list_tickets(
    State(services): State<Services>,
    query: Result<Query<ListTicketsQuery>, QueryRejection>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let tickets = run_blocking(move || services.tickets.list_tickets(&filter)).await?;
    Ok(Json(tickets))
}

pub async fn create_ticket(
    State(services): State<Services>,
    body: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let Json(req) = body?;
    let priority = match req.priority.as_deref() {
        Some(raw) => parse_priority(raw)?,
        None => Default::default(),
    };

    let ticket = run_blocking(move || {
        services.tickets.create_ticket(
            &req.title,
            req.description.as_deref(),
            priority,
            req.user_id,
        )
    })
    .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn get_ticket(
    State(services): State<Services>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Ticket>, AppError> {
    let Path(id) = id?;
    let ticket = run_blocking(move || services.tickets.get_ticket(id)).await?;
    Ok(Json(ticket))
}

/// `PATCH /tickets/:id/status`. Returns the updated ticket.
pub async fn update_status(
    State(services): State<Services>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Ticket>, AppError> {
    let Path(id) = id?;
    let Json(req) = body?;
    let status = parse_status(&req.status)?;

    let change = run_blocking(move || services.tickets.change_status(id, status)).await?;
    Ok(Json(change.ticket))
}

pub async fn list_messages(
    State(services): State<Services>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<TicketMessage>>, AppError> {
    let Path(id) = id?;
    let messages = run_blocking(move || services.tickets.list_messages(id)).await?;
    Ok(Json(messages))
}

pub async fn add_message(
    State(services): State<Services>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<AddMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TicketMessage>), AppError> {
    let Path(id) = id?;
    let Json(req) = body?;
    let message =
        run_blocking(move || services.tickets.add_message(id, req.author_id, &req.body)).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
