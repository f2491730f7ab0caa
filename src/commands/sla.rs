use anyhow::Result;

use helpdesk::tickets::parse_priority;
use helpdesk::Services;

fn format_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

pub fn set(services: &Services, priority: &str, first_response: i64, resolution: i64) -> Result<()> {
    let priority = parse_priority(priority)?;
    let config = services.sla.set_config(priority, first_response, resolution)?;
    println!(
        "SLA for {}: first response {}, resolution {}",
        config.priority,
        format_minutes(config.first_response_minutes),
        format_minutes(config.resolution_minutes)
    );
    Ok(())
}

pub fn list(services: &Services) -> Result<()> {
    let configs = services.sla.list_configs()?;

    if configs.is_empty() {
        println!("No SLA targets configured.");
        return Ok(());
    }

    println!("{:<10} {:<16} RESOLUTION", "PRIORITY", "FIRST RESPONSE");
    for config in configs {
        println!(
            "{:<10} {:<16} {}",
            config.priority,
            format_minutes(config.first_response_minutes),
            format_minutes(config.resolution_minutes)
        );
    }
    Ok(())
}

pub fn check(services: &Services, ticket_id: i64) -> Result<()> {
    let status = services.sla.ticket_status(ticket_id)?;
    let mark = |breached: bool| if breached { "BREACHED" } else { "ok" };

    println!("Ticket #{} ({})", status.ticket_id, status.priority);
    println!(
        "  First response due {}  [{}]",
        status.first_response_due_at.format("%Y-%m-%d %H:%M"),
        mark(status.first_response_breached)
    );
    if let Some(at) = status.first_responded_at {
        println!("    answered {}", at.format("%Y-%m-%d %H:%M"));
    }
    println!(
        "  Resolution due     {}  [{}]",
        status.resolution_due_at.format("%Y-%m-%d %H:%M"),
        mark(status.resolution_breached)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup_services;
    use helpdesk::models::Priority;

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(90), "1h 30m");
    }

    #[test]
    fn test_set_and_check() {
        let (services, user_id, _dir) = setup_services();
        set(&services, "critical", 15, 240).unwrap();
        let ticket = services
            .tickets
            .create_ticket("Site down", None, Priority::Critical, user_id)
            .unwrap();
        assert!(check(&services, ticket.id).is_ok());
        assert!(list(&services).is_ok());
    }

    #[test]
    fn test_set_invalid_priority() {
        let (services, _, _dir) = setup_services();
        let err = set(&services, "urgent", 15, 240).unwrap_err();
        assert!(err.to_string().contains("Invalid priority"));
    }

    #[test]
    fn test_check_without_config() {
        let (services, user_id, _dir) = setup_services();
        let ticket = services
            .tickets
            .create_ticket("No targets", None, Priority::Low, user_id)
            .unwrap();
        let err = check(&services, ticket.id).unwrap_err();
        assert!(err.to_string().contains("SLA config LOW not found"));
    }
}
