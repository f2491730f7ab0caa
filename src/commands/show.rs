use anyhow::Result;

use helpdesk::Services;

pub fn run(services: &Services, id: i64) -> Result<()> {
    let ticket = services.tickets.get_ticket(id)?;
    let owner = services.users.get_user(ticket.user_id)?;

    println!("Ticket #{}: {}", ticket.id, ticket.title);
    println!("Status: {}", ticket.status);
    println!("Priority: {}", ticket.priority);
    println!("Customer: {} <{}>", owner.full_name, owner.email);
    println!("Created: {}", ticket.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated: {}", ticket.updated_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(resolved) = ticket.resolved_at {
        println!("Resolved: {}", resolved.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(desc) = &ticket.description {
        println!("\nDescription:");
        for line in desc.lines() {
            println!("  {}", line);
        }
    }

    let messages = services.tickets.list_messages(id)?;
    if !messages.is_empty() {
        println!("\nMessages:");
        for message in messages {
            let author = message
                .author_id
                .map(|a| format!("#{}", a))
                .unwrap_or_else(|| "system".to_string());
            println!(
                "  [{}] {}: {}",
                message.created_at.format("%Y-%m-%d %H:%M"),
                author,
                message.body
            );
        }
    }

    println!();
    match services.surveys.survey_for_ticket(id)? {
        None => println!("Survey: (none)"),
        Some(survey) => match survey.rating() {
            Some(rating) => {
                println!("Survey: submitted, rating {}/5", rating);
                if let Some(comment) = survey.comment() {
                    println!("  \"{}\"", comment);
                }
            }
            None => println!("Survey: pending (token {})", survey.token),
        },
    }

    Ok(())
}
