use anyhow::Result;

use helpdesk::Services;

pub fn run(services: &Services, id: i64, text: &str, author_id: Option<i64>) -> Result<()> {
    let message = services.tickets.add_message(id, author_id, text)?;
    println!("Added message #{} to ticket #{}", message.id, id);
    Ok(())
}
