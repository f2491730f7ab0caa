use anyhow::Result;

use helpdesk::Services;

pub fn create(services: &Services, ticket_id: i64) -> Result<()> {
    let ticket = services.tickets.get_ticket(ticket_id)?;
    let survey = services.surveys.create_survey(&ticket)?;
    println!("Created survey for ticket #{}", ticket.id);
    println!("Token: {}", survey.token);
    Ok(())
}

pub fn submit(services: &Services, token: &str, rating: i64, comment: Option<&str>) -> Result<()> {
    let survey = services.surveys.submit_survey(token, rating, comment)?;
    println!(
        "Thanks! Recorded rating {}/5 for ticket #{}",
        rating, survey.ticket_id
    );
    Ok(())
}

pub fn show(services: &Services, token: &str) -> Result<()> {
    let survey = services.surveys.get_survey(token)?;
    println!("Survey for ticket #{}", survey.ticket_id);
    println!("Created: {}", survey.created_at.format("%Y-%m-%d %H:%M:%S"));
    match (survey.rating(), survey.submitted_at()) {
        (Some(rating), Some(at)) => {
            println!("Rating: {}/5", rating);
            println!("Submitted: {}", at.format("%Y-%m-%d %H:%M:%S"));
            if let Some(comment) = survey.comment() {
                println!("Comment: {}", comment);
            }
        }
        _ => println!("Status: awaiting response"),
    }
    Ok(())
}

pub fn stats(services: &Services) -> Result<()> {
    let stats = services.surveys.stats()?;
    println!("Average rating: {:.2}", stats.average_rating);
    println!("Submitted surveys: {}", stats.total_submitted);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup_services;
    use helpdesk::models::Priority;

    fn issue_survey(services: &Services, user_id: i64) -> String {
        let ticket = services
            .tickets
            .create_ticket("Rate us", None, Priority::Low, user_id)
            .unwrap();
        create(services, ticket.id).unwrap();
        services
            .surveys
            .survey_for_ticket(ticket.id)
            .unwrap()
            .unwrap()
            .token
    }

    #[test]
    fn test_create_twice_conflicts() {
        let (services, user_id, _dir) = setup_services();
        let ticket = services
            .tickets
            .create_ticket("Once", None, Priority::Low, user_id)
            .unwrap();
        create(&services, ticket.id).unwrap();
        let err = create(&services, ticket.id).unwrap_err();
        assert!(err.to_string().contains("already has a survey"));
    }

    #[test]
    fn test_submit_and_show() {
        let (services, user_id, _dir) = setup_services();
        let token = issue_survey(&services, user_id);

        show(&services, &token).unwrap();
        submit(&services, &token, 5, Some("Great")).unwrap();
        show(&services, &token).unwrap();

        let err = submit(&services, &token, 3, None).unwrap_err();
        assert_eq!(err.to_string(), "Survey already submitted");
    }

    #[test]
    fn test_submit_invalid_rating() {
        let (services, user_id, _dir) = setup_services();
        let token = issue_survey(&services, user_id);
        assert!(submit(&services, &token, 0, None).is_err());
        assert!(submit(&services, &token, 6, None).is_err());
        assert!(submit(&services, &token, 4, None).is_ok());
    }

    #[test]
    fn test_submit_unknown_token() {
        let (services, _, _dir) = setup_services();
        assert!(submit(&services, "nope", 3, None).is_err());
        assert!(show(&services, "nope").is_err());
    }

    #[test]
    fn test_stats() {
        let (services, user_id, _dir) = setup_services();
        stats(&services).unwrap();
        for rating in [4, 5, 3] {
            let token = issue_survey(&services, user_id);
            submit(&services, &token, rating, None).unwrap();
        }
        stats(&services).unwrap();
        assert_eq!(services.surveys.stats().unwrap().average_rating, 4.0);
    }
}
