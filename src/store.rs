//! Storage ports used by the services, and an in-memory implementation.
//!
//! `Database` (SQLite) is the production implementation; `MemoryStore` backs
//! tests, fuzzing and `helpdesk serve --ephemeral`.

use anyhow::{anyhow, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::{
    Article, ArticleFilter, Department, NewArticle, NewTicket, Priority, Role, SavedReply,
    SlaConfig, SubmitOutcome, SurveyState, SurveyStats, Ticket, TicketFilter, TicketMessage,
    TicketStatus, TicketSurvey, User,
};

pub trait UserStore: Send + Sync {
    /// Returns `None` when the email is already registered.
    fn create_user(&self, email: &str, full_name: &str, role: Role) -> Result<Option<User>>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
}

pub trait TicketStore: Send + Sync {
    fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket>;
    fn get_ticket(&self, id: i64) -> Result<Option<Ticket>>;
    /// Newest first.
    fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>>;
    /// Sets the status to `to` only while it is still `from`.
    /// Returns `false` if the ticket is missing or its status moved on.
    fn compare_and_set_status(&self, id: i64, from: TicketStatus, to: TicketStatus)
        -> Result<bool>;
    fn add_message(&self, ticket_id: i64, author_id: Option<i64>, body: &str)
        -> Result<TicketMessage>;
    fn list_messages(&self, ticket_id: i64) -> Result<Vec<TicketMessage>>;
}

pub trait SurveyStore: Send + Sync {
    /// Returns `None` when the ticket already has a survey.
    fn insert_survey(&self, ticket_id: i64, token: &str) -> Result<Option<TicketSurvey>>;
    fn get_survey_by_token(&self, token: &str) -> Result<Option<TicketSurvey>>;
    fn get_survey_for_ticket(&self, ticket_id: i64) -> Result<Option<TicketSurvey>>;
    fn list_surveys(&self) -> Result<Vec<TicketSurvey>>;
    /// Moves a pending survey to submitted. Must be atomic: of any number of
    /// concurrent calls for one token, at most one returns `Submitted`.
    fn submit_survey(&self, token: &str, rating: u8, comment: Option<&str>)
        -> Result<SubmitOutcome>;
    fn survey_stats(&self) -> Result<SurveyStats>;
}

pub trait DepartmentStore: Send + Sync {
    /// Returns `None` when the name is already taken.
    fn create_department(&self, name: &str, description: Option<&str>)
        -> Result<Option<Department>>;
    fn get_department(&self, id: i64) -> Result<Option<Department>>;
    fn list_departments(&self) -> Result<Vec<Department>>;
}

pub trait SlaStore: Send + Sync {
    /// Creates the config for `priority` or replaces its targets.
    fn upsert_sla_config(
        &self,
        priority: Priority,
        first_response_minutes: u32,
        resolution_minutes: u32,
    ) -> Result<SlaConfig>;
    fn get_sla_config(&self, priority: Priority) -> Result<Option<SlaConfig>>;
    fn list_sla_configs(&self) -> Result<Vec<SlaConfig>>;
}

pub trait SavedReplyStore: Send + Sync {
    fn create_saved_reply(&self, title: &str, body: &str, created_by: Option<i64>)
        -> Result<SavedReply>;
    fn get_saved_reply(&self, id: i64) -> Result<Option<SavedReply>>;
    fn list_saved_replies(&self) -> Result<Vec<SavedReply>>;
}

pub trait ArticleStore: Send + Sync {
    fn create_article(&self, article: &NewArticle) -> Result<Article>;
    fn get_article(&self, id: i64) -> Result<Option<Article>>;
    /// Newest first.
    fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>>;
}

/// Everything the services need from a backing store.
pub trait Store:
    UserStore + TicketStore + SurveyStore + DepartmentStore + SlaStore + SavedReplyStore + ArticleStore
{
}

impl<T> Store for T where
    T: UserStore
        + TicketStore
        + SurveyStore
        + DepartmentStore
        + SlaStore
        + SavedReplyStore
        + ArticleStore
{
}

#[derive(Default)]
struct MemoryState {
    last_user_id: i64,
    last_ticket_id: i64,
    last_message_id: i64,
    last_survey_id: i64,
    last_department_id: i64,
    last_sla_id: i64,
    last_reply_id: i64,
    last_article_id: i64,
    users: BTreeMap<i64, User>,
    tickets: BTreeMap<i64, Ticket>,
    messages: Vec<TicketMessage>,
    surveys: Vec<TicketSurvey>,
    departments: BTreeMap<i64, Department>,
    sla_configs: BTreeMap<i64, SlaConfig>,
    saved_replies: BTreeMap<i64, SavedReply>,
    articles: BTreeMap<i64, Article>,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Process-local store. Every operation holds one lock for its whole
/// duration, which makes `submit_survey` a check-and-write in one step.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl UserStore for MemoryStore {
    fn create_user(&self, email: &str, full_name: &str, role: Role) -> Result<Option<User>> {
        let mut state = self.state()?;
        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Ok(None);
        }
        let user = User {
            id: next_id(&mut state.last_user_id),
            email: email.to_string(),
            full_name: full_name.to_string(),
            role,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.state()?.users.get(&id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.state()?.users.values().cloned().collect())
    }
}

impl TicketStore for MemoryStore {
    fn create_ticket(&self, new: &NewTicket) -> Result<Ticket> {
        let mut state = self.state()?;
        let now = Utc::now();
        let ticket = Ticket {
            id: next_id(&mut state.last_ticket_id),
            title: new.title.clone(),
            description: new.description.clone(),
            priority: new.priority,
            status: TicketStatus::Todo,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };
        state.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        Ok(self.state()?.tickets.get(&id).cloned())
    }

    fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        Ok(self
            .state()?
            .tickets
            .values()
            .rev()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    fn compare_and_set_status(
        &self,
        id: i64,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<bool> {
        let mut state = self.state()?;
        match state.tickets.get_mut(&id) {
            Some(ticket) if ticket.status == from => {
                let now = Utc::now();
                ticket.status = to;
                ticket.updated_at = now;
                ticket.resolved_at = to.is_terminal().then_some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn add_message(
        &self,
        ticket_id: i64,
        author_id: Option<i64>,
        body: &str,
    ) -> Result<TicketMessage> {
        let mut state = self.state()?;
        let message = TicketMessage {
            id: next_id(&mut state.last_message_id),
            ticket_id,
            author_id,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    fn list_messages(&self, ticket_id: i64) -> Result<Vec<TicketMessage>> {
        Ok(self
            .state()?
            .messages
            .iter()
            .filter(|m| m.ticket_id == ticket_id)
            .cloned()
            .collect())
    }
}

impl SurveyStore for MemoryStore {
    fn insert_survey(&self, ticket_id: i64, token: &str) -> Result<Option<TicketSurvey>> {
        let mut state = self.state()?;
        if state.surveys.iter().any(|s| s.ticket_id == ticket_id) {
            return Ok(None);
        }
        if state.surveys.iter().any(|s| s.token == token) {
            return Err(anyhow!("survey token collision"));
        }
        let survey = TicketSurvey {
            id: next_id(&mut state.last_survey_id),
            ticket_id,
            token: token.to_string(),
            state: SurveyState::Pending,
            created_at: Utc::now(),
        };
        state.surveys.push(survey.clone());
        Ok(Some(survey))
    }

    fn get_survey_by_token(&self, token: &str) -> Result<Option<TicketSurvey>> {
        Ok(self
            .state()?
            .surveys
            .iter()
            .find(|s| s.token == token)
            .cloned())
    }

    fn get_survey_for_ticket(&self, ticket_id: i64) -> Result<Option<TicketSurvey>> {
        Ok(self
            .state()?
            .surveys
            .iter()
            .find(|s| s.ticket_id == ticket_id)
            .cloned())
    }

    fn list_surveys(&self) -> Result<Vec<TicketSurvey>> {
        Ok(self.state()?.surveys.clone())
    }

    fn submit_survey(
        &self,
        token: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> Result<SubmitOutcome> {
        let mut state = self.state()?;
        let Some(survey) = state.surveys.iter_mut().find(|s| s.token == token) else {
            return Ok(SubmitOutcome::NotFound);
        };
        if survey.is_submitted() {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }
        survey.state = SurveyState::Submitted {
            rating,
            comment: comment.map(str::to_string),
            submitted_at: Utc::now(),
        };
        Ok(SubmitOutcome::Submitted(survey.clone()))
    }

    fn survey_stats(&self) -> Result<SurveyStats> {
        let state = self.state()?;
        Ok(SurveyStats::from_ratings(
            state.surveys.iter().filter_map(TicketSurvey::rating),
        ))
    }
}

impl DepartmentStore for MemoryStore {
    fn create_department(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Department>> {
        let mut state = self.state()?;
        if state
            .departments
            .values()
            .any(|d| d.name.eq_ignore_ascii_case(name))
        {
            return Ok(None);
        }
        let department = Department {
            id: next_id(&mut state.last_department_id),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };
        state.departments.insert(department.id, department.clone());
        Ok(Some(department))
    }

    fn get_department(&self, id: i64) -> Result<Option<Department>> {
        Ok(self.state()?.departments.get(&id).cloned())
    }

    fn list_departments(&self) -> Result<Vec<Department>> {
        Ok(self.state()?.departments.values().cloned().collect())
    }
}

impl SlaStore for MemoryStore {
    fn upsert_sla_config(
        &self,
        priority: Priority,
        first_response_minutes: u32,
        resolution_minutes: u32,
    ) -> Result<SlaConfig> {
        let mut state = self.state()?;
        let now = Utc::now();
        if let Some(config) = state
            .sla_configs
            .values_mut()
            .find(|c| c.priority == priority)
        {
            config.first_response_minutes = first_response_minutes;
            config.resolution_minutes = resolution_minutes;
            config.updated_at = now;
            return Ok(config.clone());
        }
        let config = SlaConfig {
            id: next_id(&mut state.last_sla_id),
            priority,
            first_response_minutes,
            resolution_minutes,
            created_at: now,
            updated_at: now,
        };
        state.sla_configs.insert(config.id, config.clone());
        Ok(config)
    }

    fn get_sla_config(&self, priority: Priority) -> Result<Option<SlaConfig>> {
        Ok(self
            .state()?
            .sla_configs
            .values()
            .find(|c| c.priority == priority)
            .cloned())
    }

    fn list_sla_configs(&self) -> Result<Vec<SlaConfig>> {
        Ok(self.state()?.sla_configs.values().cloned().collect())
    }
}

impl SavedReplyStore for MemoryStore {
    fn create_saved_reply(
        &self,
        title: &str,
        body: &str,
        created_by: Option<i64>,
    ) -> Result<SavedReply> {
        let mut state = self.state()?;
        let reply = SavedReply {
            id: next_id(&mut state.last_reply_id),
            title: title.to_string(),
            body: body.to_string(),
            created_by,
            created_at: Utc::now(),
        };
        state.saved_replies.insert(reply.id, reply.clone());
        Ok(reply)
    }

    fn get_saved_reply(&self, id: i64) -> Result<Option<SavedReply>> {
        Ok(self.state()?.saved_replies.get(&id).cloned())
    }

    fn list_saved_replies(&self) -> Result<Vec<SavedReply>> {
        Ok(self.state()?.saved_replies.values().cloned().collect())
    }
}

impl ArticleStore for MemoryStore {
    fn create_article(&self, new: &NewArticle) -> Result<Article> {
        let mut state = self.state()?;
        let now = Utc::now();
        let article = Article {
            id: next_id(&mut state.last_article_id),
            title: new.title.clone(),
            body: new.body.clone(),
            category: new.category.clone(),
            published: new.published,
            created_at: now,
            updated_at: now,
        };
        state.articles.insert(article.id, article.clone());
        Ok(article)
    }

    fn get_article(&self, id: i64) -> Result<Option<Article>> {
        Ok(self.state()?.articles.get(&id).cloned())
    }

    fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        Ok(self
            .state()?
            .articles
            .values()
            .rev()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }
}
