use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::models::{
    Article, ArticleFilter, Department, NewArticle, NewTicket, Priority, Role, SavedReply,
    SlaConfig, SubmitOutcome, SurveyState, SurveyStats, Ticket, TicketFilter, TicketMessage,
    TicketStatus, TicketSurvey, UnknownVariant, User,
};
use crate::store::{
    ArticleStore, DepartmentStore, SavedReplyStore, SlaStore, SurveyStore, TicketStore, UserStore,
};

const SCHEMA_VERSION: i32 = 2;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const USER_COLUMNS: &str = "id, email, full_name, role, created_at";
const TICKET_COLUMNS: &str =
    "id, title, description, priority, status, user_id, created_at, updated_at, resolved_at";
const MESSAGE_COLUMNS: &str = "id, ticket_id, author_id, body, created_at";
const SURVEY_COLUMNS: &str =
    "id, ticket_id, token, rating, comment, is_submitted, submitted_at, created_at";
const DEPARTMENT_COLUMNS: &str = "id, name, description, created_at";
const SLA_COLUMNS: &str =
    "id, priority, first_response_minutes, resolution_minutes, created_at, updated_at";
const REPLY_COLUMNS: &str = "id, title, body, created_by, created_at";
const ARTICLE_COLUMNS: &str = "id, title, body, category, published, created_at, updated_at";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open database")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        init_schema(&conn)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version < SCHEMA_VERSION {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                full_name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'CUSTOMER',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                priority TEXT NOT NULL DEFAULT 'MEDIUM',
                status TEXT NOT NULL DEFAULT 'TODO',
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                resolved_at TEXT,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );

            -- Conversation thread on a ticket
            CREATE TABLE IF NOT EXISTS ticket_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticket_id INTEGER NOT NULL,
                author_id INTEGER,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE,
                FOREIGN KEY (author_id) REFERENCES users(id)
            );

            -- One CSAT survey per ticket, redeemed once by token
            CREATE TABLE IF NOT EXISTS ticket_surveys (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticket_id INTEGER NOT NULL UNIQUE,
                token TEXT NOT NULL UNIQUE,
                rating INTEGER,
                comment TEXT,
                is_submitted INTEGER NOT NULL DEFAULT 0,
                submitted_at TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
            );

            -- Version 2: admin tables and the knowledge base
            CREATE TABLE IF NOT EXISTS departments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                description TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sla_configs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                priority TEXT NOT NULL UNIQUE,
                first_response_minutes INTEGER NOT NULL,
                resolution_minutes INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS saved_replies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                created_by INTEGER,
                created_at TEXT NOT NULL,
                FOREIGN KEY (created_by) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS kb_articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                category TEXT,
                published INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            CREATE INDEX IF NOT EXISTS idx_tickets_priority ON tickets(priority);
            CREATE INDEX IF NOT EXISTS idx_tickets_user ON tickets(user_id);
            CREATE INDEX IF NOT EXISTS idx_messages_ticket ON ticket_messages(ticket_id);
            CREATE INDEX IF NOT EXISTS idx_surveys_submitted ON ticket_surveys(is_submitted);
            "#,
        )?;

        conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
    }

    conn.execute("PRAGMA foreign_keys = ON", [])?;

    Ok(())
}

impl UserStore for Database {
    fn create_user(&self, email: &str, full_name: &str, role: Role) -> Result<Option<User>> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        let rows = conn.execute(
            "INSERT INTO users (email, full_name, role, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(email) DO NOTHING",
            params![email, full_name, role.as_str(), now],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        user_by_id(&conn, conn.last_insert_rowid())
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        user_by_id(&*self.conn()?, id)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

impl TicketStore for Database {
    fn create_ticket(&self, new: &NewTicket) -> Result<Ticket> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO tickets (title, description, priority, status, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                new.title,
                new.description,
                new.priority.as_str(),
                TicketStatus::Todo.as_str(),
                new.user_id,
                now
            ],
        )
        .context("Failed to insert ticket")?;
        ticket_by_id(&conn, conn.last_insert_rowid())?
            .ok_or_else(|| anyhow!("ticket vanished after insert"))
    }

    fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        ticket_by_id(&*self.conn()?, id)
    }

    fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let mut sql = format!("SELECT {TICKET_COLUMNS} FROM tickets");
        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params_vec.push(Box::new(status.as_str()));
        }

        if let Some(priority) = filter.priority {
            conditions.push("priority = ?");
            params_vec.push(Box::new(priority.as_str()));
        }

        if let Some(user_id) = filter.user_id {
            conditions.push("user_id = ?");
            params_vec.push(Box::new(user_id));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(" ORDER BY id DESC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let tickets = stmt
            .query_map(params_refs.as_slice(), ticket_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    fn compare_and_set_status(
        &self,
        id: i64,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let resolved_at = to.is_terminal().then(|| now.clone());
        let rows = self.conn()?.execute(
            "UPDATE tickets SET status = ?1, updated_at = ?2, resolved_at = ?3
             WHERE id = ?4 AND status = ?5",
            params![to.as_str(), now, resolved_at, id, from.as_str()],
        )?;
        Ok(rows > 0)
    }

    fn add_message(
        &self,
        ticket_id: i64,
        author_id: Option<i64>,
        body: &str,
    ) -> Result<TicketMessage> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO ticket_messages (ticket_id, author_id, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![ticket_id, author_id, body, now],
        )?;
        let id = conn.last_insert_rowid();
        let message = conn.query_row(
            &format!("SELECT {MESSAGE_COLUMNS} FROM ticket_messages WHERE id = ?1"),
            [id],
            message_from_row,
        )?;
        Ok(message)
    }

    fn list_messages(&self, ticket_id: i64) -> Result<Vec<TicketMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM ticket_messages WHERE ticket_id = ?1 ORDER BY id"
        ))?;
        let messages = stmt
            .query_map([ticket_id], message_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(messages)
    }
}

impl SurveyStore for Database {
    fn insert_survey(&self, ticket_id: i64, token: &str) -> Result<Option<TicketSurvey>> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        let rows = conn.execute(
            "INSERT INTO ticket_surveys (ticket_id, token, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(ticket_id) DO NOTHING",
            params![ticket_id, token, now],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        survey_where(&conn, "id = ?1", conn.last_insert_rowid())
    }

    fn get_survey_by_token(&self, token: &str) -> Result<Option<TicketSurvey>> {
        survey_where(&*self.conn()?, "token = ?1", token)
    }

    fn get_survey_for_ticket(&self, ticket_id: i64) -> Result<Option<TicketSurvey>> {
        survey_where(&*self.conn()?, "ticket_id = ?1", ticket_id)
    }

    fn list_surveys(&self) -> Result<Vec<TicketSurvey>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {SURVEY_COLUMNS} FROM ticket_surveys ORDER BY id"))?;
        let surveys = stmt
            .query_map([], survey_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(surveys)
    }

    fn submit_survey(
        &self,
        token: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> Result<SubmitOutcome> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        // The is_submitted guard makes this a compare-and-set across connections.
        let rows = conn.execute(
            "UPDATE ticket_surveys SET rating = ?1, comment = ?2, is_submitted = 1, submitted_at = ?3
             WHERE token = ?4 AND is_submitted = 0",
            params![rating, comment, now, token],
        )?;

        if rows == 0 {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM ticket_surveys WHERE token = ?1",
                    [token],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            return Ok(if exists {
                SubmitOutcome::AlreadySubmitted
            } else {
                SubmitOutcome::NotFound
            });
        }

        let survey = survey_where(&conn, "token = ?1", token)?
            .ok_or_else(|| anyhow!("survey vanished after submit"))?;
        Ok(SubmitOutcome::Submitted(survey))
    }

    fn survey_stats(&self) -> Result<SurveyStats> {
        let (average_rating, total): (f64, i64) = self.conn()?.query_row(
            "SELECT COALESCE(AVG(rating), 0.0), COUNT(*) FROM ticket_surveys WHERE is_submitted = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(SurveyStats {
            average_rating,
            total_submitted: total as u64,
        })
    }
}

impl DepartmentStore for Database {
    fn create_department(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Department>> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        let rows = conn.execute(
            "INSERT INTO departments (name, description, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO NOTHING",
            params![name, description, now],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        department_by_id(&conn, conn.last_insert_rowid())
    }

    fn get_department(&self, id: i64) -> Result<Option<Department>> {
        department_by_id(&*self.conn()?, id)
    }

    fn list_departments(&self) -> Result<Vec<Department>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY id"
        ))?;
        let departments = stmt
            .query_map([], department_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(departments)
    }
}

impl SlaStore for Database {
    fn upsert_sla_config(
        &self,
        priority: Priority,
        first_response_minutes: u32,
        resolution_minutes: u32,
    ) -> Result<SlaConfig> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO sla_configs (priority, first_response_minutes, resolution_minutes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(priority) DO UPDATE SET
                first_response_minutes = excluded.first_response_minutes,
                resolution_minutes = excluded.resolution_minutes,
                updated_at = excluded.updated_at",
            params![priority.as_str(), first_response_minutes, resolution_minutes, now],
        )?;
        sla_by_priority(&conn, priority)?.ok_or_else(|| anyhow!("SLA config vanished after upsert"))
    }

    fn get_sla_config(&self, priority: Priority) -> Result<Option<SlaConfig>> {
        sla_by_priority(&*self.conn()?, priority)
    }

    fn list_sla_configs(&self) -> Result<Vec<SlaConfig>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {SLA_COLUMNS} FROM sla_configs ORDER BY id"))?;
        let configs = stmt
            .query_map([], sla_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(configs)
    }
}

impl SavedReplyStore for Database {
    fn create_saved_reply(
        &self,
        title: &str,
        body: &str,
        created_by: Option<i64>,
    ) -> Result<SavedReply> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO saved_replies (title, body, created_by, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![title, body, created_by, now],
        )
        .context("Failed to insert saved reply")?;
        reply_by_id(&conn, conn.last_insert_rowid())?
            .ok_or_else(|| anyhow!("saved reply vanished after insert"))
    }

    fn get_saved_reply(&self, id: i64) -> Result<Option<SavedReply>> {
        reply_by_id(&*self.conn()?, id)
    }

    fn list_saved_replies(&self) -> Result<Vec<SavedReply>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {REPLY_COLUMNS} FROM saved_replies ORDER BY id"))?;
        let replies = stmt
            .query_map([], reply_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(replies)
    }
}

impl ArticleStore for Database {
    fn create_article(&self, new: &NewArticle) -> Result<Article> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO kb_articles (title, body, category, published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![new.title, new.body, new.category, new.published, now],
        )?;
        article_by_id(&conn, conn.last_insert_rowid())?
            .ok_or_else(|| anyhow!("article vanished after insert"))
    }

    fn get_article(&self, id: i64) -> Result<Option<Article>> {
        article_by_id(&*self.conn()?, id)
    }

    fn list_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let mut sql = format!("SELECT {ARTICLE_COLUMNS} FROM kb_articles");
        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if !filter.include_drafts {
            conditions.push("published = 1");
        }

        // instr keeps % and _ in the query literal, unlike LIKE.
        if let Some(query) = &filter.query {
            conditions.push("(instr(lower(title), lower(?)) > 0 OR instr(lower(body), lower(?)) > 0)");
            params_vec.push(Box::new(query.clone()));
            params_vec.push(Box::new(query.clone()));
        }

        if let Some(category) = &filter.category {
            conditions.push("category = ? COLLATE NOCASE");
            params_vec.push(Box::new(category.clone()));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(" ORDER BY id DESC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let articles = stmt
            .query_map(params_refs.as_slice(), article_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(articles)
    }
}

fn user_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

fn ticket_by_id(conn: &Connection, id: i64) -> Result<Option<Ticket>> {
    let ticket = conn
        .query_row(
            &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
            [id],
            ticket_from_row,
        )
        .optional()?;
    Ok(ticket)
}

fn survey_where<P: rusqlite::ToSql>(
    conn: &Connection,
    condition: &str,
    param: P,
) -> Result<Option<TicketSurvey>> {
    let survey = conn
        .query_row(
            &format!("SELECT {SURVEY_COLUMNS} FROM ticket_surveys WHERE {condition}"),
            [param],
            survey_from_row,
        )
        .optional()?;
    Ok(survey)
}

fn department_by_id(conn: &Connection, id: i64) -> Result<Option<Department>> {
    let department = conn
        .query_row(
            &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = ?1"),
            [id],
            department_from_row,
        )
        .optional()?;
    Ok(department)
}

fn sla_by_priority(conn: &Connection, priority: Priority) -> Result<Option<SlaConfig>> {
    let config = conn
        .query_row(
            &format!("SELECT {SLA_COLUMNS} FROM sla_configs WHERE priority = ?1"),
            [priority.as_str()],
            sla_from_row,
        )
        .optional()?;
    Ok(config)
}

fn reply_by_id(conn: &Connection, id: i64) -> Result<Option<SavedReply>> {
    let reply = conn
        .query_row(
            &format!("SELECT {REPLY_COLUMNS} FROM saved_replies WHERE id = ?1"),
            [id],
            reply_from_row,
        )
        .optional()?;
    Ok(reply)
}

fn article_by_id(conn: &Connection, id: i64) -> Result<Option<Article>> {
    let article = conn
        .query_row(
            &format!("SELECT {ARTICLE_COLUMNS} FROM kb_articles WHERE id = ?1"),
            [id],
            article_from_row,
        )
        .optional()?;
    Ok(article)
}

fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn sla_from_row(row: &Row<'_>) -> rusqlite::Result<SlaConfig> {
    Ok(SlaConfig {
        id: row.get(0)?,
        priority: parse_column(row, 1)?,
        first_response_minutes: row.get(2)?,
        resolution_minutes: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
        updated_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn reply_from_row(row: &Row<'_>) -> rusqlite::Result<SavedReply> {
    Ok(SavedReply {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        created_by: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        category: row.get(3)?,
        published: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        role: parse_column(row, 3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: parse_column(row, 3)?,
        status: parse_column(row, 4)?,
        user_id: row.get(5)?,
        created_at: parse_datetime(row.get::<_, String>(6)?),
        updated_at: parse_datetime(row.get::<_, String>(7)?),
        resolved_at: row.get::<_, Option<String>>(8)?.map(parse_datetime),
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<TicketMessage> {
    Ok(TicketMessage {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        author_id: row.get(2)?,
        body: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn survey_from_row(row: &Row<'_>) -> rusqlite::Result<TicketSurvey> {
    let is_submitted: bool = row.get(5)?;
    let state = if is_submitted {
        SurveyState::Submitted {
            rating: row.get(3)?,
            comment: row.get(4)?,
            submitted_at: row
                .get::<_, Option<String>>(6)?
                .map(parse_datetime)
                .unwrap_or_else(Utc::now),
        }
    } else {
        SurveyState::Pending
    };

    Ok(TicketSurvey {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        token: row.get(2)?,
        state,
        created_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
