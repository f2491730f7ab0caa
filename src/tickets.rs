//! Ticket lifecycle: creation, the status workflow and the message thread.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::WorkflowConfig;
use crate::error::{HelpdeskError, Result};
use crate::models::{
    NewTicket, Priority, Ticket, TicketFilter, TicketMessage, TicketStatus, TicketSurvey,
};
use crate::store::{TicketStore, UserStore};
use crate::surveys::SurveyService;
use crate::workflow::TransitionPolicy;

/// What a status change did.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub ticket: Ticket,
    pub previous: TicketStatus,
    /// Survey issued because the ticket was resolved, if any.
    pub survey: Option<TicketSurvey>,
}

#[derive(Clone)]
pub struct TicketService {
    tickets: Arc<dyn TicketStore>,
    users: Arc<dyn UserStore>,
    surveys: SurveyService,
    policy: TransitionPolicy,
    survey_on_resolve: bool,
}

impl TicketService {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        users: Arc<dyn UserStore>,
        surveys: SurveyService,
        workflow: &WorkflowConfig,
    ) -> Self {
        Self {
            tickets,
            users,
            surveys,
            policy: workflow.transition_policy,
            survey_on_resolve: workflow.survey_on_resolve,
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn create_ticket(
        &self,
        title: &str,
        description: Option<&str>,
        priority: Priority,
        user_id: i64,
    ) -> Result<Ticket> {
        let title = title.trim();
        if title.is_empty() {
            return Err(HelpdeskError::validation("Title must not be empty"));
        }
        if self.users.get_user(user_id)?.is_none() {
            return Err(HelpdeskError::not_found("User", user_id));
        }

        let ticket = self.tickets.create_ticket(&NewTicket {
            title: title.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            priority,
            user_id,
        })?;
        info!(ticket_id = ticket.id, user_id, priority = %priority, "Created ticket");
        Ok(ticket)
    }

    pub fn get_ticket(&self, id: i64) -> Result<Ticket> {
        self.tickets
            .get_ticket(id)?
            .ok_or_else(|| HelpdeskError::not_found("Ticket", id))
    }

    pub fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        Ok(self.tickets.list_tickets(filter)?)
    }

    /// Moves a ticket to `to` if the transition policy allows it. Entering
    /// RESOLVED issues a survey when `survey_on_resolve` is set and the ticket
    /// has none yet.
    pub fn change_status(&self, id: i64, to: TicketStatus) -> Result<StatusChange> {
        let current = self.get_ticket(id)?;
        let from = current.status;

        if from == to {
            return Ok(StatusChange {
                ticket: current,
                previous: from,
                survey: None,
            });
        }

        if !self.policy.allows(from, to) {
            let allowed: Vec<&str> = self
                .policy
                .allowed_targets(from)
                .into_iter()
                .map(TicketStatus::as_str)
                .collect();
            return Err(HelpdeskError::invalid_state(format!(
                "Cannot move ticket {} from {} to {}; allowed: {}",
                id,
                from,
                to,
                allowed.join(", ")
            )));
        }

        if !self.tickets.compare_and_set_status(id, from, to)? {
            return Err(HelpdeskError::conflict(format!(
                "Ticket {} was changed by someone else; reload and retry",
                id
            )));
        }

        let ticket = self.get_ticket(id)?;
        info!(ticket_id = id, from = %from, to = %to, "Ticket status changed");

        let survey = if to == TicketStatus::Resolved && self.survey_on_resolve {
            self.issue_survey(&ticket)
        } else {
            None
        };

        Ok(StatusChange {
            ticket,
            previous: from,
            survey,
        })
    }

    // The status change is already committed here, so survey trouble is only
    // logged.
    fn issue_survey(&self, ticket: &Ticket) -> Option<TicketSurvey> {
        match self.surveys.survey_for_ticket(ticket.id) {
            Ok(Some(_)) => {
                debug!(ticket_id = ticket.id, "Ticket already has a survey; not issuing another");
                return None;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(ticket_id = ticket.id, error = %e, "Could not look up survey");
                return None;
            }
        }

        match self.surveys.create_survey(ticket) {
            Ok(survey) => Some(survey),
            Err(HelpdeskError::Conflict(_)) => None,
            Err(e) => {
                warn!(ticket_id = ticket.id, error = %e, "Failed to issue survey");
                None
            }
        }
    }

    pub fn add_message(
        &self,
        ticket_id: i64,
        author_id: Option<i64>,
        body: &str,
    ) -> Result<TicketMessage> {
        let body = body.trim();
        if body.is_empty() {
            return Err(HelpdeskError::validation("Message body must not be empty"));
        }
        self.get_ticket(ticket_id)?;
        if let Some(author_id) = author_id {
            if self.users.get_user(author_id)?.is_none() {
                return Err(HelpdeskError::not_found("User", author_id));
            }
        }

        let message = self.tickets.add_message(ticket_id, author_id, body)?;
        debug!(ticket_id, message_id = message.id, "Added message");
        Ok(message)
    }

    pub fn list_messages(&self, ticket_id: i64) -> Result<Vec<TicketMessage>> {
        self.get_ticket(ticket_id)?;
        Ok(self.tickets.list_messages(ticket_id)?)
    }
}

/// Parses a status as sent by clients, reporting unknown values as a
/// validation failure.
pub fn parse_status(raw: &str) -> Result<TicketStatus> {
    raw.parse()
        .map_err(|e: crate::models::UnknownVariant| HelpdeskError::validation(e.to_string()))
}

pub fn parse_priority(raw: &str) -> Result<Priority> {
    raw.parse()
        .map_err(|e: crate::models::UnknownVariant| HelpdeskError::validation(e.to_string()))
}
