use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket urgency, as shown on the board cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

/// Board column a ticket sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Todo,
    InProgress,
    WaitingVendor,
    Resolved,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Todo,
        TicketStatus::InProgress,
        TicketStatus::WaitingVendor,
        TicketStatus::Resolved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Todo => "TODO",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::WaitingVendor => "WAITING_VENDOR",
            TicketStatus::Resolved => "RESOLVED",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == TicketStatus::Resolved
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Agent,
    #[default]
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Agent => "AGENT",
            Role::Customer => "CUSTOMER",
        }
    }
}

/// Error returned when a string names no known enum member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {} '{}'. Must be one of: {}",
            self.kind, self.value, self.expected
        )
    }
}

impl std::error::Error for UnknownVariant {}

// Accepts "IN_PROGRESS", "in_progress" and "in-progress" alike.
fn normalize(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace('-', "_")
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            _ => Err(UnknownVariant {
                kind: "priority",
                value: s.to_string(),
                expected: "LOW, MEDIUM, HIGH, CRITICAL",
            }),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "TODO" => Ok(TicketStatus::Todo),
            "IN_PROGRESS" => Ok(TicketStatus::InProgress),
            "WAITING_VENDOR" => Ok(TicketStatus::WaitingVendor),
            "RESOLVED" => Ok(TicketStatus::Resolved),
            _ => Err(UnknownVariant {
                kind: "status",
                value: s.to_string(),
                expected: "TODO, IN_PROGRESS, WAITING_VENDOR, RESOLVED",
            }),
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "AGENT" => Ok(Role::Agent),
            "CUSTOMER" => Ok(Role::Customer),
            _ => Err(UnknownVariant {
                kind: "role",
                value: s.to_string(),
                expected: "AGENT, CUSTOMER",
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TicketStatus,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Fields needed to open a ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub user_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub user_id: Option<i64>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.status.map_or(true, |s| ticket.status == s)
            && self.priority.map_or(true, |p| ticket.priority == p)
            && self.user_id.map_or(true, |u| ticket.user_id == u)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMessage {
    pub id: i64,
    pub ticket_id: i64,
    pub author_id: Option<i64>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a satisfaction survey. `Pending` may move to `Submitted`
/// exactly once; `Submitted` is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum SurveyState {
    Pending,
    Submitted {
        rating: u8,
        comment: Option<String>,
        submitted_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketSurvey {
    pub id: i64,
    pub ticket_id: i64,
    pub token: String,
    pub state: SurveyState,
    pub created_at: DateTime<Utc>,
}

impl TicketSurvey {
    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SurveyState::Submitted { .. })
    }

    pub fn rating(&self) -> Option<u8> {
        match self.state {
            SurveyState::Submitted { rating, .. } => Some(rating),
            SurveyState::Pending => None,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match &self.state {
            SurveyState::Submitted { comment, .. } => comment.as_deref(),
            SurveyState::Pending => None,
        }
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            SurveyState::Submitted { submitted_at, .. } => Some(submitted_at),
            SurveyState::Pending => None,
        }
    }
}

/// Result of trying to redeem a survey token.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(TicketSurvey),
    AlreadySubmitted,
    NotFound,
}

/// Aggregate CSAT figures over submitted surveys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyStats {
    pub average_rating: f64,
    pub total_submitted: u64,
}

impl SurveyStats {
    pub fn from_ratings<I: IntoIterator<Item = u8>>(ratings: I) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0u64, 0u64), |(sum, count), r| (sum + u64::from(r), count + 1));
        let average_rating = if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        };
        SurveyStats {
            average_rating,
            total_submitted: count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response and resolution targets for one priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaConfig {
    pub id: i64,
    pub priority: Priority,
    pub first_response_minutes: u32,
    pub resolution_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a ticket stands against the SLA for its priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaStatus {
    pub ticket_id: i64,
    pub priority: Priority,
    pub first_response_due_at: DateTime<Utc>,
    pub first_responded_at: Option<DateTime<Utc>>,
    pub first_response_breached: bool,
    pub resolution_due_at: DateTime<Utc>,
    pub resolution_breached: bool,
}

/// Canned answer agents paste into a ticket thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReply {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Knowledge-base article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    /// Case-insensitive substring of the title or body.
    pub query: Option<String>,
    pub category: Option<String>,
    pub include_drafts: bool,
}

impl ArticleFilter {
    pub fn matches(&self, article: &Article) -> bool {
        let query_hit = self.query.as_deref().map_or(true, |q| {
            let q = q.to_ascii_lowercase();
            article.title.to_ascii_lowercase().contains(&q)
                || article.body.to_ascii_lowercase().contains(&q)
        });
        let category_hit = self.category.as_deref().map_or(true, |c| {
            article
                .category
                .as_deref()
                .is_some_and(|own| own.eq_ignore_ascii_case(c))
        });
        query_hit && category_hit && (self.include_drafts || article.published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_accepts_wire_and_cli_spellings() {
        assert_eq!("IN_PROGRESS".parse::<TicketStatus>(), Ok(TicketStatus::InProgress));
        assert_eq!("in-progress".parse::<TicketStatus>(), Ok(TicketStatus::InProgress));
        assert_eq!(" waiting_vendor ".parse::<TicketStatus>(), Ok(TicketStatus::WaitingVendor));
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        let err = "CLOSED".parse::<TicketStatus>().unwrap_err();
        assert!(err.to_string().contains("Invalid status 'CLOSED'"));
    }

    #[test]
    fn test_status_display_matches_serde() {
        for status in TicketStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_priority_display_matches_serde() {
        for priority in Priority::ALL {
            let json = serde_json::to_string(&priority).unwrap();
            assert_eq!(json, format!("\"{}\"", priority));
        }
    }

    #[test]
    fn test_stats_empty_is_zero() {
        let stats = SurveyStats::from_ratings(Vec::new());
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.total_submitted, 0);
    }

    #[test]
    fn test_stats_mean() {
        let stats = SurveyStats::from_ratings(vec![4, 5, 3]);
        assert_eq!(stats.average_rating, 4.0);
        assert_eq!(stats.total_submitted, 3);
    }

    #[test]
    fn test_stats_serializes_camel_case() {
        let json = serde_json::to_value(SurveyStats::from_ratings(vec![5])).unwrap();
        assert_eq!(json["averageRating"], 5.0);
        assert_eq!(json["totalSubmitted"], 1);
    }

    #[test]
    fn test_filter_matches() {
        let now = Utc::now();
        let ticket = Ticket {
            id: 1,
            title: "Printer on fire".to_string(),
            description: None,
            priority: Priority::High,
            status: TicketStatus::Todo,
            user_id: 7,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };
        assert!(TicketFilter::default().matches(&ticket));
        let by_user = TicketFilter {
            user_id: Some(7),
            ..Default::default()
        };
        assert!(by_user.matches(&ticket));
        let by_status = TicketFilter {
            status: Some(TicketStatus::Resolved),
            ..Default::default()
        };
        assert!(!by_status.matches(&ticket));
    }

    #[test]
    fn test_article_filter() {
        let now = Utc::now();
        let article = Article {
            id: 1,
            title: "Resetting your VPN token".to_string(),
            body: "Open the portal and choose Reset.".to_string(),
            category: Some("Network".to_string()),
            published: false,
            created_at: now,
            updated_at: now,
        };
        assert!(!ArticleFilter::default().matches(&article));

        let drafts = ArticleFilter {
            include_drafts: true,
            ..Default::default()
        };
        assert!(drafts.matches(&article));

        let hit = ArticleFilter {
            query: Some("PORTAL".to_string()),
            category: Some("network".to_string()),
            include_drafts: true,
        };
        assert!(hit.matches(&article));

        let miss = ArticleFilter {
            category: Some("Hardware".to_string()),
            include_drafts: true,
            ..Default::default()
        };
        assert!(!miss.matches(&article));
    }
}
