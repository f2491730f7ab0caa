#![no_main]

//! Fuzz target for the ticket status workflow.
//!
//! Drives a ticket through arbitrary status strings under both transition
//! policies and checks that the stored status always matches what the
//! service reported, and that at most one survey is ever issued.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use helpdesk::config::WorkflowConfig;
use helpdesk::models::{Priority, Role, TicketStatus};
use helpdesk::store::MemoryStore;
use helpdesk::tickets::parse_status;
use helpdesk::workflow::TransitionPolicy;
use helpdesk::Services;

#[derive(Arbitrary, Debug)]
struct WorkflowInput {
    strict: bool,
    moves: Vec<String>,
}

fuzz_target!(|input: WorkflowInput| {
    let workflow = WorkflowConfig {
        transition_policy: if input.strict {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        },
        survey_on_resolve: true,
    };
    let services = Services::new(Arc::new(MemoryStore::new()), &workflow);

    let Ok(user) = services
        .users
        .create_user("fuzz@example.com", "Fuzz", Role::Agent)
    else {
        return;
    };
    let Ok(ticket) = services
        .tickets
        .create_ticket("Fuzz", None, Priority::Low, user.id)
    else {
        return;
    };

    let mut expected = TicketStatus::Todo;
    for raw in input.moves.iter().take(64) {
        let Ok(to) = parse_status(raw) else {
            continue;
        };
        match services.tickets.change_status(ticket.id, to) {
            Ok(change) => {
                assert_eq!(change.previous, expected);
                assert!(workflow.transition_policy.allows(expected, to));
                expected = to;
            }
            Err(_) => assert!(!workflow.transition_policy.allows(expected, to)),
        }

        let stored = services.tickets.get_ticket(ticket.id).expect("ticket");
        assert_eq!(stored.status, expected);
        assert_eq!(stored.resolved_at.is_some(), expected == TicketStatus::Resolved);
    }

    assert!(services.surveys.list_surveys().expect("surveys").len() <= 1);
});
