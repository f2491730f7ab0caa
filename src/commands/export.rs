use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};

use helpdesk::models::{
    Article, ArticleFilter, Department, SavedReply, SlaConfig, Ticket, TicketFilter,
    TicketMessage, TicketSurvey, User,
};
use helpdesk::Services;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub messages: Vec<TicketMessage>,
    pub survey: Option<ExportedSurvey>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedSurvey {
    pub token: String,
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<TicketSurvey> for ExportedSurvey {
    fn from(survey: TicketSurvey) -> Self {
        Self {
            rating: survey.rating(),
            comment: survey.comment().map(str::to_string),
            submitted_at: survey.submitted_at(),
            created_at: survey.created_at,
            token: survey.token,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub version: i32,
    pub exported_at: String,
    pub users: Vec<User>,
    pub tickets: Vec<ExportedTicket>,
    pub departments: Vec<Department>,
    pub sla_configs: Vec<SlaConfig>,
    pub saved_replies: Vec<SavedReply>,
    pub articles: Vec<Article>,
}

fn export_ticket(services: &Services, ticket: Ticket) -> Result<ExportedTicket> {
    let messages = services.tickets.list_messages(ticket.id)?;
    let survey = services
        .surveys
        .survey_for_ticket(ticket.id)?
        .map(ExportedSurvey::from);
    Ok(ExportedTicket {
        ticket,
        messages,
        survey,
    })
}

fn build_export(services: &Services) -> Result<ExportData> {
    let mut tickets = services.tickets.list_tickets(&TicketFilter::default())?;
    tickets.sort_by_key(|t| t.id);

    let tickets = tickets
        .into_iter()
        .map(|t| export_ticket(services, t))
        .collect::<Result<Vec<_>>>()?;

    let mut articles = services.knowledge_base.search(ArticleFilter {
        include_drafts: true,
        ..Default::default()
    })?;
    articles.sort_by_key(|a| a.id);

    Ok(ExportData {
        version: 2,
        exported_at: Utc::now().to_rfc3339(),
        users: services.users.list_users()?,
        tickets,
        departments: services.departments.list_departments()?,
        sla_configs: services.sla.list_configs()?,
        saved_replies: services.saved_replies.list_saved_replies()?,
        articles,
    })
}

pub fn run_json(services: &Services, output_path: Option<&str>) -> Result<()> {
    let data = build_export(services)?;
    let json = serde_json::to_string_pretty(&data)?;

    match output_path {
        Some(path) => {
            fs::write(path, json).context("Failed to write export file")?;
            eprintln!("Exported {} tickets to {}", data.tickets.len(), path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}
