#![no_main]

//! Fuzz target for survey redemption.
//!
//! Feeds arbitrary tokens, ratings and comments to the survey service and
//! checks that a token is never redeemed twice and that out-of-range input
//! never reaches the store.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use helpdesk::config::WorkflowConfig;
use helpdesk::models::{Priority, Role};
use helpdesk::store::MemoryStore;
use helpdesk::surveys::{MAX_RATING, MIN_RATING};
use helpdesk::Services;

#[derive(Arbitrary, Debug)]
struct Attempt {
    /// Use the real token instead of `token`.
    use_issued_token: bool,
    token: String,
    rating: i64,
    comment: Option<String>,
}

#[derive(Arbitrary, Debug)]
struct SubmitInput {
    attempts: Vec<Attempt>,
}

fuzz_target!(|input: SubmitInput| {
    let services = Services::new(Arc::new(MemoryStore::new()), &WorkflowConfig::default());

    let Ok(user) = services
        .users
        .create_user("fuzz@example.com", "Fuzz", Role::Customer)
    else {
        return;
    };
    let Ok(ticket) = services
        .tickets
        .create_ticket("Fuzz", None, Priority::Medium, user.id)
    else {
        return;
    };
    let Ok(survey) = services.surveys.create_survey(&ticket) else {
        return;
    };

    let mut successes = 0;
    for attempt in input.attempts.iter().take(32) {
        let token = if attempt.use_issued_token {
            survey.token.as_str()
        } else {
            attempt.token.as_str()
        };

        if let Ok(submitted) =
            services
                .surveys
                .submit_survey(token, attempt.rating, attempt.comment.as_deref())
        {
            successes += 1;
            assert!((MIN_RATING..=MAX_RATING).contains(&attempt.rating));
            assert_eq!(submitted.ticket_id, ticket.id);
        }
    }

    assert!(successes <= 1, "survey redeemed {} times", successes);

    let stats = services.surveys.stats().expect("stats");
    assert_eq!(stats.total_submitted, successes);
    if successes == 0 {
        assert_eq!(stats.average_rating, 0.0);
    }
});
