use std::sync::Arc;
use tracing::info;

use crate::error::{HelpdeskError, Result};
use crate::models::SavedReply;
use crate::store::{SavedReplyStore, UserStore};

#[derive(Clone)]
pub struct SavedReplyService {
    store: Arc<dyn SavedReplyStore>,
    users: Arc<dyn UserStore>,
}

impl SavedReplyService {
    pub fn new(store: Arc<dyn SavedReplyStore>, users: Arc<dyn UserStore>) -> Self {
        Self { store, users }
    }

    /// `created_by`, when given, must name an existing user.
    pub fn create_saved_reply(
        &self,
        title: &str,
        body: &str,
        created_by: Option<i64>,
    ) -> Result<SavedReply> {
        let title = title.trim();
        if title.is_empty() {
            return Err(HelpdeskError::validation("Title must not be empty"));
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(HelpdeskError::validation("Reply body must not be empty"));
        }
        if let Some(user_id) = created_by {
            if self.users.get_user(user_id)?.is_none() {
                return Err(HelpdeskError::not_found("User", user_id));
            }
        }

        let reply = self.store.create_saved_reply(title, body, created_by)?;
        info!(reply_id = reply.id, "Created saved reply");
        Ok(reply)
    }

    pub fn get_saved_reply(&self, id: i64) -> Result<SavedReply> {
        self.store
            .get_saved_reply(id)?
            .ok_or_else(|| HelpdeskError::not_found("Saved reply", id))
    }

    pub fn list_saved_replies(&self) -> Result<Vec<SavedReply>> {
        Ok(self.store.list_saved_replies()?)
    }
}
