//! Service-level targets per priority, and how a ticket measures up.
//!
//! The first response is the first message on the thread written by someone
//! other than the ticket's owner. Anonymous messages do not count.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::info;

use crate::error::{HelpdeskError, Result};
use crate::models::{Priority, SlaConfig, SlaStatus, Ticket, TicketMessage};
use crate::store::{SlaStore, TicketStore};

/// One year.
pub const MAX_TARGET_MINUTES: i64 = 365 * 24 * 60;

#[derive(Clone)]
pub struct SlaService {
    store: Arc<dyn SlaStore>,
    tickets: Arc<dyn TicketStore>,
}

impl SlaService {
    pub fn new(store: Arc<dyn SlaStore>, tickets: Arc<dyn TicketStore>) -> Self {
        Self { store, tickets }
    }

    /// Sets the targets for `priority`, replacing any earlier ones.
    pub fn set_config(
        &self,
        priority: Priority,
        first_response_minutes: i64,
        resolution_minutes: i64,
    ) -> Result<SlaConfig> {
        let first_response = validate_minutes("firstResponseMinutes", first_response_minutes)?;
        let resolution = validate_minutes("resolutionMinutes", resolution_minutes)?;
        if first_response > resolution {
            return Err(HelpdeskError::validation(
                "firstResponseMinutes must not exceed resolutionMinutes",
            ));
        }

        let config = self
            .store
            .upsert_sla_config(priority, first_response, resolution)?;
        info!(
            priority = %priority,
            first_response_minutes = first_response,
            resolution_minutes = resolution,
            "Saved SLA config"
        );
        Ok(config)
    }

    pub fn get_config(&self, priority: Priority) -> Result<SlaConfig> {
        self.store
            .get_sla_config(priority)?
            .ok_or_else(|| HelpdeskError::not_found("SLA config", priority))
    }

    pub fn list_configs(&self) -> Result<Vec<SlaConfig>> {
        Ok(self.store.list_sla_configs()?)
    }

    /// Measures the ticket against the config for its priority.
    pub fn ticket_status(&self, ticket_id: i64) -> Result<SlaStatus> {
        let ticket = self
            .tickets
            .get_ticket(ticket_id)?
            .ok_or_else(|| HelpdeskError::not_found("Ticket", ticket_id))?;
        let config = self.get_config(ticket.priority)?;
        let messages = self.tickets.list_messages(ticket_id)?;
        Ok(evaluate(&ticket, &config, &messages, Utc::now()))
    }
}

fn validate_minutes(field: &str, minutes: i64) -> Result<u32> {
    if !(1..=MAX_TARGET_MINUTES).contains(&minutes) {
        return Err(HelpdeskError::validation(format!(
            "{} must be between 1 and {}",
            field, MAX_TARGET_MINUTES
        )));
    }
    u32::try_from(minutes).map_err(|_| HelpdeskError::validation(format!("{} is too large", field)))
}

/// Deadlines run from `created_at`. An open deadline is breached once
/// `now` passes it; a met one is breached if it was met late.
pub fn evaluate(
    ticket: &Ticket,
    config: &SlaConfig,
    messages: &[TicketMessage],
    now: DateTime<Utc>,
) -> SlaStatus {
    let first_response_due_at =
        ticket.created_at + Duration::minutes(i64::from(config.first_response_minutes));
    let resolution_due_at =
        ticket.created_at + Duration::minutes(i64::from(config.resolution_minutes));

    let first_responded_at = messages
        .iter()
        .filter(|m| m.author_id.is_some_and(|author| author != ticket.user_id))
        .map(|m| m.created_at)
        .min();

    SlaStatus {
        ticket_id: ticket.id,
        priority: ticket.priority,
        first_response_due_at,
        first_responded_at,
        first_response_breached: first_responded_at.unwrap_or(now) > first_response_due_at,
        resolution_due_at,
        resolution_breached: ticket.resolved_at.unwrap_or(now) > resolution_due_at,
    }
}
