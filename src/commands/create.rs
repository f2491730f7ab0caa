use anyhow::Result;

use helpdesk::tickets::parse_priority;
use helpdesk::Services;

pub fn run(
    services: &Services,
    title: &str,
    description: Option<&str>,
    priority: &str,
    user_id: i64,
) -> Result<()> {
    let priority = parse_priority(priority)?;
    let ticket = services
        .tickets
        .create_ticket(title, description, priority, user_id)?;
    println!("Created ticket #{}", ticket.id);
    Ok(())
}
