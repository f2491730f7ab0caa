use anyhow::Result;

use helpdesk::Services;

pub fn add(services: &Services, title: &str, body: &str, author: Option<i64>) -> Result<()> {
    let reply = services
        .saved_replies
        .create_saved_reply(title, body, author)?;
    println!("Saved reply #{}: {}", reply.id, reply.title);
    Ok(())
}

pub fn list(services: &Services) -> Result<()> {
    let replies = services.saved_replies.list_saved_replies()?;

    if replies.is_empty() {
        println!("No saved replies.");
        return Ok(());
    }

    for reply in replies {
        println!("#{:<4} {}", reply.id, reply.title);
        for line in reply.body.lines() {
            println!("      {}", line);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup_services;

    #[test]
    fn test_add_and_list() {
        let (services, user_id, _dir) = setup_services();
        add(&services, "Restart", "Please restart.\nThen retry.", Some(user_id)).unwrap();
        let replies = services.saved_replies.list_saved_replies().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].created_by, Some(user_id));
        assert!(list(&services).is_ok());
    }

    #[test]
    fn test_add_unknown_author() {
        let (services, _, _dir) = setup_services();
        let err = add(&services, "Restart", "Body", Some(404)).unwrap_err();
        assert!(err.to_string().contains("User 404 not found"));
    }
}
