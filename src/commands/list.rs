use anyhow::Result;

use helpdesk::models::TicketFilter;
use helpdesk::tickets::{parse_priority, parse_status};
use helpdesk::Services;

pub fn run(
    services: &Services,
    status: Option<&str>,
    priority: Option<&str>,
    user_id: Option<i64>,
) -> Result<()> {
    let filter = TicketFilter {
        status: status.map(parse_status).transpose()?,
        priority: priority.map(parse_priority).transpose()?,
        user_id,
    };
    let tickets = services.tickets.list_tickets(&filter)?;

    if tickets.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }

    for ticket in tickets {
        let status_display = format!("[{}]", ticket.status);
        let date = ticket.created_at.format("%Y-%m-%d");
        println!(
            "#{:<4} {:16} {:<40} {:8} {}",
            ticket.id,
            status_display,
            truncate(&ticket.title, 40),
            ticket.priority,
            date
        );
    }

    Ok(())
}

pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
