use anyhow::Result;
use tracing::info;

use crate::models::{Ticket, TicketSurvey};

/// Delivers a fresh survey token to the customer.
pub trait SurveyNotifier: Send + Sync {
    fn survey_created(&self, ticket: &Ticket, survey: &TicketSurvey) -> Result<()>;
}

/// Writes the token to the log instead of sending mail. Mail delivery is
/// handled outside this service.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl SurveyNotifier for LogNotifier {
    fn survey_created(&self, ticket: &Ticket, survey: &TicketSurvey) -> Result<()> {
        info!(
            ticket_id = ticket.id,
            user_id = ticket.user_id,
            token = %survey.token,
            "Generated survey token"
        );
        Ok(())
    }
}
