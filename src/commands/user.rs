use anyhow::Result;

use helpdesk::models::Role;
use helpdesk::Services;

pub fn add(services: &Services, email: &str, full_name: &str, role: &str) -> Result<()> {
    let role: Role = role.parse()?;
    let user = services.users.create_user(email, full_name, role)?;
    println!("Created user #{} <{}> ({})", user.id, user.email, user.role);
    Ok(())
}

pub fn list(services: &Services) -> Result<()> {
    let users = services.users.list_users()?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    for user in users {
        println!(
            "#{:<4} {:<9} {:<32} {}",
            user.id, user.role, user.email, user.full_name
        );
    }
    Ok(())
}
