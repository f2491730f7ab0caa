use std::sync::Arc;

use crate::config::WorkflowConfig;
use crate::departments::DepartmentService;
use crate::knowledge_base::KnowledgeBaseService;
use crate::notify::{LogNotifier, SurveyNotifier};
use crate::saved_replies::SavedReplyService;
use crate::sla::SlaService;
use crate::store::Store;
use crate::surveys::SurveyService;
use crate::tickets::TicketService;
use crate::users::UserService;

/// The services, wired to one backing store. Cheap to clone.
#[derive(Clone)]
pub struct Services {
    pub tickets: TicketService,
    pub surveys: SurveyService,
    pub users: UserService,
    pub departments: DepartmentService,
    pub sla: SlaService,
    pub saved_replies: SavedReplyService,
    pub knowledge_base: KnowledgeBaseService,
}

impl Services {
    pub fn new<S: Store + 'static>(store: Arc<S>, workflow: &WorkflowConfig) -> Self {
        Self::with_notifier(store, workflow, Arc::new(LogNotifier))
    }

    pub fn with_notifier<S: Store + 'static>(
        store: Arc<S>,
        workflow: &WorkflowConfig,
        notifier: Arc<dyn SurveyNotifier>,
    ) -> Self {
        let surveys = SurveyService::new(store.clone(), notifier);
        let users = UserService::new(store.clone());
        let departments = DepartmentService::new(store.clone());
        let sla = SlaService::new(store.clone(), store.clone());
        let saved_replies = SavedReplyService::new(store.clone(), store.clone());
        let knowledge_base = KnowledgeBaseService::new(store.clone());
        let tickets = TicketService::new(store.clone(), store, surveys.clone(), workflow);
        Self {
            tickets,
            surveys,
            users,
            departments,
            sla,
            saved_replies,
            knowledge_base,
        }
    }
}
