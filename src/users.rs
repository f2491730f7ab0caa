use std::sync::Arc;
use tracing::info;

use crate::error::{HelpdeskError, Result};
use crate::models::{Role, User};
use crate::store::UserStore;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn create_user(&self, email: &str, full_name: &str, role: Role) -> Result<User> {
        let email = normalize_email(email)?;
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(HelpdeskError::validation("Full name must not be empty"));
        }

        let user = self
            .store
            .create_user(&email, full_name, role)?
            .ok_or_else(|| {
                HelpdeskError::conflict(format!("A user with email {} already exists", email))
            })?;
        info!(user_id = user.id, role = %user.role, "Created user");
        Ok(user)
    }

    pub fn get_user(&self, id: i64) -> Result<User> {
        self.store
            .get_user(id)?
            .ok_or_else(|| HelpdeskError::not_found("User", id))
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.store.list_users()?)
    }
}

/// Lowercases and sanity-checks an address: a non-empty local part and a
/// dotted domain, no whitespace.
fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split('.')
                    .filter(|part| !part.is_empty())
                    .count()
                    >= 2
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(HelpdeskError::validation(format!(
            "Invalid email address '{}'",
            email
        )));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_create_user_normalizes_email() {
        let users = service();
        let user = users
            .create_user("  Ada@Example.COM ", " Ada Lovelace ", Role::Agent)
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.full_name, "Ada Lovelace");
        assert_eq!(user.role, Role::Agent);
    }

    #[test]
    fn test_invalid_emails_rejected() {
        let users = service();
        for bad in ["", "plain", "@example.com", "a@b", "a@.com", "a@example.", "a b@example.com", "a@@example.com"] {
            let err = users.create_user(bad, "Someone", Role::Customer).unwrap_err();
            assert!(matches!(err, HelpdeskError::Validation(_)), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = service()
            .create_user("x@example.com", "   ", Role::Customer)
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Validation(_)));
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let users = service();
        users.create_user("x@example.com", "X", Role::Customer).unwrap();
        let err = users
            .create_user("X@EXAMPLE.com", "X2", Role::Customer)
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Conflict(_)));
    }

    #[test]
    fn test_get_missing_user() {
        let err = service().get_user(12).unwrap_err();
        assert_eq!(err.to_string(), "User 12 not found");
    }
}
