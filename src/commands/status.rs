use anyhow::Result;

use helpdesk::tickets::parse_status;
use helpdesk::Services;

pub fn run(services: &Services, id: i64, status: &str) -> Result<()> {
    let to = parse_status(status)?;
    let change = services.tickets.change_status(id, to)?;

    if change.previous == change.ticket.status {
        println!("Ticket #{} is already {}", id, change.ticket.status);
    } else {
        println!(
            "Moved ticket #{} from {} to {}",
            id, change.previous, change.ticket.status
        );
    }

    if let Some(survey) = change.survey {
        println!("Survey issued: {}", survey.token);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup_services;
    use helpdesk::models::{Priority, TicketStatus};

    fn ticket(services: &Services, user_id: i64) -> i64 {
        services
            .tickets
            .create_ticket("Laptop won't boot", None, Priority::High, user_id)
            .unwrap()
            .id
    }

    #[test]
    fn test_move_through_workflow() {
        let (services, user_id, _dir) = setup_services();
        let id = ticket(&services, user_id);

        run(&services, id, "in-progress").unwrap();
        assert_eq!(
            services.tickets.get_ticket(id).unwrap().status,
            TicketStatus::InProgress
        );

        run(&services, id, "waiting_vendor").unwrap();
        run(&services, id, "RESOLVED").unwrap();
        let resolved = services.tickets.get_ticket(id).unwrap();
        assert_eq!(resolved.status, TicketStatus::Resolved);
        assert!(resolved.resolved_at.is_some());
    }

    #[test]
    fn test_resolve_issues_survey() {
        let (services, user_id, _dir) = setup_services();
        let id = ticket(&services, user_id);

        run(&services, id, "resolved").unwrap();
        assert!(services.surveys.survey_for_ticket(id).unwrap().is_some());
    }

    #[test]
    fn test_same_status_is_noop() {
        let (services, user_id, _dir) = setup_services();
        let id = ticket(&services, user_id);
        assert!(run(&services, id, "todo").is_ok());
    }

    #[test]
    fn test_invalid_status() {
        let (services, user_id, _dir) = setup_services();
        let id = ticket(&services, user_id);
        let err = run(&services, id, "closed").unwrap_err();
        assert!(err.to_string().contains("Invalid status 'closed'"));
    }

    #[test]
    fn test_missing_ticket() {
        let (services, _, _dir) = setup_services();
        assert!(run(&services, 99999, "resolved").is_err());
    }
}
