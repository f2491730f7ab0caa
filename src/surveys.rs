//! CSAT surveys: issue a one-time token per ticket, redeem it once, and
//! aggregate the ratings.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{HelpdeskError, Result};
use crate::models::{SubmitOutcome, SurveyStats, Ticket, TicketSurvey};
use crate::notify::SurveyNotifier;
use crate::store::SurveyStore;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
pub const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Clone)]
pub struct SurveyService {
    store: Arc<dyn SurveyStore>,
    notifier: Arc<dyn SurveyNotifier>,
}

impl SurveyService {
    pub fn new(store: Arc<dyn SurveyStore>, notifier: Arc<dyn SurveyNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Issues a survey for `ticket` and hands the token to the notifier.
    /// A notifier failure is logged; the survey is still returned.
    pub fn create_survey(&self, ticket: &Ticket) -> Result<TicketSurvey> {
        let token = Uuid::new_v4().to_string();
        let survey = self
            .store
            .insert_survey(ticket.id, &token)?
            .ok_or_else(|| {
                HelpdeskError::conflict(format!("Ticket {} already has a survey", ticket.id))
            })?;

        if let Err(e) = self.notifier.survey_created(ticket, &survey) {
            warn!(ticket_id = ticket.id, error = %e, "Failed to deliver survey token");
        }

        Ok(survey)
    }

    pub fn get_survey(&self, token: &str) -> Result<TicketSurvey> {
        self.store
            .get_survey_by_token(token)?
            .ok_or_else(|| HelpdeskError::not_found("Survey", token))
    }

    pub fn survey_for_ticket(&self, ticket_id: i64) -> Result<Option<TicketSurvey>> {
        Ok(self.store.get_survey_for_ticket(ticket_id)?)
    }

    pub fn list_surveys(&self) -> Result<Vec<TicketSurvey>> {
        Ok(self.store.list_surveys()?)
    }

    /// Redeems `token`. A bad rating or comment never consumes the token, but
    /// an unknown or already redeemed token is reported ahead of it.
    pub fn submit_survey(
        &self,
        token: &str,
        rating: i64,
        comment: Option<&str>,
    ) -> Result<TicketSurvey> {
        let input = validate_rating(rating).and_then(|r| Ok((r, normalize_comment(comment)?)));
        let (rating, comment) = match input {
            Ok(input) => input,
            Err(invalid) => {
                return Err(match self.store.get_survey_by_token(token)? {
                    None => HelpdeskError::not_found("Survey", token),
                    Some(survey) if survey.is_submitted() => {
                        HelpdeskError::invalid_state("Survey already submitted")
                    }
                    Some(_) => invalid,
                })
            }
        };

        match self.store.submit_survey(token, rating, comment)? {
            SubmitOutcome::Submitted(survey) => {
                info!(
                    survey_id = survey.id,
                    ticket_id = survey.ticket_id,
                    rating,
                    "Survey submitted"
                );
                Ok(survey)
            }
            SubmitOutcome::AlreadySubmitted => {
                Err(HelpdeskError::invalid_state("Survey already submitted"))
            }
            SubmitOutcome::NotFound => Err(HelpdeskError::not_found("Survey", token)),
        }
    }

    pub fn stats(&self) -> Result<SurveyStats> {
        Ok(self.store.survey_stats()?)
    }
}

fn validate_rating(rating: i64) -> Result<u8> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(HelpdeskError::validation(format!(
            "Rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, rating
        )));
    }
    u8::try_from(rating).map_err(|e| HelpdeskError::Storage(e.into()))
}

fn normalize_comment(comment: Option<&str>) -> Result<Option<&str>> {
    let Some(comment) = comment.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    let chars = comment.chars().count();
    if chars > MAX_COMMENT_CHARS {
        return Err(HelpdeskError::validation(format!(
            "Comment is {} characters; the limit is {}",
            chars, MAX_COMMENT_CHARS
        )));
    }
    Ok(Some(comment))
}
