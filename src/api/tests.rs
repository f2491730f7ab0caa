#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use super::router;
use crate::app::Services;
use crate::config::WorkflowConfig;
use crate::models::Role;
use crate::store::MemoryStore;
use crate::workflow::TransitionPolicy;

struct TestApp {
    services: Services,
    customer_id: i64,
}

impl TestApp {
    fn new() -> Self {
        Self::with_workflow(WorkflowConfig::default())
    }

    fn with_workflow(workflow: WorkflowConfig) -> Self {
        let services = Services::new(Arc::new(MemoryStore::new()), &workflow);
        let customer = services
            .users
            .create_user("customer@example.com", "Casey Customer", Role::Customer)
            .unwrap();
        Self {
            services,
            customer_id: customer.id,
        }
    }

    fn app(&self) -> Router {
        router(self.services.clone())
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self.app().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_ticket(&self, title: &str) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/tickets",
                Some(json!({ "title": title, "userId": self.customer_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    async fn create_survey(&self, ticket_id: i64) -> String {
        let (status, body) = self
            .call(Method::POST, "/surveys", Some(json!({ "ticketId": ticket_id })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_and_get_ticket() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/tickets",
            Some(json!({
                "title": "  Printer on fire  ",
                "description": "Third floor",
                "priority": "high",
                "userId": app.customer_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Printer on fire");
    assert_eq!(body["priority"], "HIGH");
    assert_eq!(body["status"], "TODO");
    assert!(body["resolvedAt"].is_null());

    let id = body["id"].as_i64().unwrap();
    let (status, body) = app.call(Method::GET, &format!("/tickets/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], app.customer_id);
}

#[tokio::test]
async fn test_create_ticket_for_unknown_user() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/tickets",
            Some(json!({ "title": "Orphan", "userId": 999 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_missing_ticket() {
    let app = TestApp::new();
    let (status, _) = app.call(Method::GET, "/tickets/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_ticket_id() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/tickets/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PATH");
}

#[tokio::test]
async fn test_malformed_json_body() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/tickets")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.app().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_list_tickets_with_filters() {
    let app = TestApp::new();
    let first = app.create_ticket("First").await;
    app.create_ticket("Second").await;
    app.call(
        Method::PATCH,
        &format!("/tickets/{}/status", first),
        Some(json!({ "status": "IN_PROGRESS" })),
    )
    .await;

    let (status, body) = app.call(Method::GET, "/tickets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app
        .call(Method::GET, "/tickets?status=in-progress", None)
        .await;
    let tickets = body.as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["id"], first);

    let (status, body) = app.call(Method::GET, "/tickets?status=LOST", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_status_to_every_member() {
    let app = TestApp::new();
    let id = app.create_ticket("Walk the board").await;
    for status in ["IN_PROGRESS", "WAITING_VENDOR", "TODO", "RESOLVED"] {
        let (code, body) = app
            .call(
                Method::PATCH,
                &format!("/tickets/{}/status", id),
                Some(json!({ "status": status })),
            )
            .await;
        assert_eq!(code, StatusCode::OK, "moving to {}", status);
        assert_eq!(body["status"], status);
    }
}

#[tokio::test]
async fn test_update_status_rejects_unknown_value() {
    let app = TestApp::new();
    let id = app.create_ticket("Bad status").await;
    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/tickets/{}/status", id),
            Some(json!({ "status": "ARCHIVED" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("ARCHIVED"));
}

#[tokio::test]
async fn test_strict_policy_rejects_transition() {
    let app = TestApp::with_workflow(WorkflowConfig {
        transition_policy: TransitionPolicy::Strict,
        survey_on_resolve: true,
    });
    let id = app.create_ticket("Strict").await;
    app.call(
        Method::PATCH,
        &format!("/tickets/{}/status", id),
        Some(json!({ "status": "RESOLVED" })),
    )
    .await;

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/tickets/{}/status", id),
            Some(json!({ "status": "WAITING_VENDOR" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("allowed: IN_PROGRESS"));

    let (_, body) = app.call(Method::GET, &format!("/tickets/{}", id), None).await;
    assert_eq!(body["status"], "RESOLVED");
}

#[tokio::test]
async fn test_resolving_issues_one_survey() {
    let app = TestApp::new();
    let id = app.create_ticket("Resolve me").await;
    let uri = format!("/tickets/{}/status", id);

    app.call(Method::PATCH, &uri, Some(json!({ "status": "RESOLVED" })))
        .await;
    app.call(Method::PATCH, &uri, Some(json!({ "status": "IN_PROGRESS" })))
        .await;
    app.call(Method::PATCH, &uri, Some(json!({ "status": "RESOLVED" })))
        .await;

    let surveys = app.services.surveys.list_surveys().unwrap();
    assert_eq!(surveys.len(), 1);
    assert_eq!(surveys[0].ticket_id, id);

    let (status, _) = app
        .call(Method::POST, "/surveys", Some(json!({ "ticketId": id })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_messages() {
    let app = TestApp::new();
    let id = app.create_ticket("Chatty").await;
    let uri = format!("/tickets/{}/messages", id);

    let (status, body) = app
        .call(
            Method::POST,
            &uri,
            Some(json!({ "body": "Have you tried turning it off?", "authorId": app.customer_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticketId"], id);

    let (status, _) = app.call(Method::POST, &uri, Some(json!({ "body": "   " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = app.call(Method::GET, &uri, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_users() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/users",
            Some(json!({ "email": "Agent@Example.com", "fullName": "Avery Agent", "role": "agent" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "agent@example.com");
    assert_eq!(body["role"], "AGENT");

    let (status, _) = app
        .call(
            Method::POST,
            "/users",
            Some(json!({ "email": "agent@example.com", "fullName": "Duplicate" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.call(Method::GET, "/users", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = app.call(Method::GET, "/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_survey_for_missing_ticket() {
    let app = TestApp::new();
    let (status, _) = app
        .call(Method::POST, "/surveys", Some(json!({ "ticketId": 77 })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_survey_by_token() {
    let app = TestApp::new();
    let id = app.create_ticket("Survey me").await;
    let token = app.create_survey(id).await;

    let (status, body) = app
        .call(Method::GET, &format!("/surveys/{}", token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticketId"], id);
    assert_eq!(body["isSubmitted"], false);
    assert!(body["rating"].is_null());

    let (status, _) = app.call(Method::GET, "/surveys/no-such-token", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_survey_once() {
    let app = TestApp::new();
    let id = app.create_ticket("Rate me").await;
    let token = app.create_survey(id).await;
    let uri = format!("/surveys/{}/submit", token);

    let (status, body) = app
        .call(
            Method::POST,
            &uri,
            Some(json!({ "rating": 5, "comment": "Quick fix" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSubmitted"], true);
    assert_eq!(body["rating"], 5);
    assert_eq!(body["comment"], "Quick fix");
    assert!(body["submittedAt"].is_string());

    let (status, body) = app
        .call(Method::POST, &uri, Some(json!({ "rating": 1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Survey already submitted");

    let survey = app.services.surveys.get_survey(&token).unwrap();
    assert_eq!(survey.rating(), Some(5));
}

#[tokio::test]
async fn test_submit_survey_unknown_token() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/surveys/deadbeef/submit",
            Some(json!({ "rating": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_submit_survey_rating_out_of_range() {
    let app = TestApp::new();
    let id = app.create_ticket("Out of range").await;
    let token = app.create_survey(id).await;
    let uri = format!("/surveys/{}/submit", token);

    for rating in [0, 6, -1, 1_000_000] {
        let (status, _) = app
            .call(Method::POST, &uri, Some(json!({ "rating": rating })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "rating {}", rating);
    }

    // A rejected rating must not consume the token.
    let (status, _) = app
        .call(Method::POST, &uri, Some(json!({ "rating": 4 })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::POST, &uri, Some(json!({ "rating": 9 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Survey already submitted");
}

#[tokio::test]
async fn test_submit_survey_unknown_token_with_bad_rating() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/surveys/deadbeef/submit",
            Some(json!({ "rating": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_survey_stats() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/surveys/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["averageRating"], 0.0);
    assert_eq!(body["totalSubmitted"], 0);

    for rating in [4, 5, 3] {
        let id = app.create_ticket("Stats").await;
        let token = app.create_survey(id).await;
        let (status, _) = app
            .call(
                Method::POST,
                &format!("/surveys/{}/submit", token),
                Some(json!({ "rating": rating })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    // Pending surveys do not count.
    let pending = app.create_ticket("Pending").await;
    app.create_survey(pending).await;

    let (_, body) = app.call(Method::GET, "/surveys/stats", None).await;
    assert_eq!(body["averageRating"], 4.0);
    assert_eq!(body["totalSubmitted"], 3);
}

#[tokio::test]
async fn test_departments() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/departments",
            Some(json!({ "name": " Network ", "description": "VPN and Wi-Fi" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Network");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .call(Method::POST, "/departments", Some(json!({ "name": "NETWORK" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, body) = app
        .call(Method::GET, &format!("/departments/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "VPN and Wi-Fi");
    assert!(body["createdAt"].is_string());

    let (_, body) = app.call(Method::GET, "/departments", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.call(Method::GET, "/departments/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sla_configs_upsert_per_priority() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/sla-configs",
            Some(json!({ "priority": "high", "firstResponseMinutes": 60, "resolutionMinutes": 480 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["priority"], "HIGH");
    let id = body["id"].clone();

    let (status, body) = app
        .call(
            Method::POST,
            "/sla-configs",
            Some(json!({ "priority": "HIGH", "firstResponseMinutes": 30, "resolutionMinutes": 240 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["firstResponseMinutes"], 30);

    let (status, body) = app.call(Method::GET, "/sla-configs/high", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resolutionMinutes"], 240);

    let (_, body) = app.call(Method::GET, "/sla-configs", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.call(Method::GET, "/sla-configs/LOW", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.call(Method::GET, "/sla-configs/URGENT", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_sla_config_rejects_inverted_targets() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/sla-configs",
            Some(json!({ "priority": "LOW", "firstResponseMinutes": 600, "resolutionMinutes": 60 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_ticket_sla_status() {
    let app = TestApp::new();
    let ticket_id = app.create_ticket("Mail bounces").await;

    // MEDIUM has no targets yet.
    let (status, _) = app
        .call(Method::GET, &format!("/tickets/{}/sla", ticket_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.call(
        Method::POST,
        "/sla-configs",
        Some(json!({ "priority": "MEDIUM", "firstResponseMinutes": 60, "resolutionMinutes": 480 })),
    )
    .await;
    let agent = app
        .services
        .users
        .create_user("agent@example.com", "Avery Agent", Role::Agent)
        .unwrap();
    app.call(
        Method::POST,
        &format!("/tickets/{}/messages", ticket_id),
        Some(json!({ "body": "On it", "authorId": agent.id })),
    )
    .await;

    let (status, body) = app
        .call(Method::GET, &format!("/tickets/{}/sla", ticket_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticketId"], ticket_id);
    assert_eq!(body["priority"], "MEDIUM");
    assert!(body["firstRespondedAt"].is_string());
    assert_eq!(body["firstResponseBreached"], false);
    assert_eq!(body["resolutionBreached"], false);
}

#[tokio::test]
async fn test_saved_replies() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/saved-replies",
            Some(json!({ "title": "Restart", "body": "Please restart and retry.", "createdBy": app.customer_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["createdBy"], app.customer_id);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .call(Method::GET, &format!("/saved-replies/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Restart");

    let (status, _) = app
        .call(
            Method::POST,
            "/saved-replies",
            Some(json!({ "title": "Ghost", "body": "Boo", "createdBy": 999 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(Method::POST, "/saved-replies", Some(json!({ "title": "No body" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = app.call(Method::GET, "/saved-replies", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_knowledge_base_search() {
    let app = TestApp::new();
    for (title, published) in [("VPN setup", true), ("Printer jams", true), ("VPN draft", false)] {
        let (status, _) = app
            .call(
                Method::POST,
                "/kb/articles",
                Some(json!({
                    "title": title,
                    "body": "Steps inside.",
                    "category": "Howto",
                    "published": published,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.call(Method::GET, "/kb/articles", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Printer jams", "VPN setup"]);

    let (_, body) = app.call(Method::GET, "/kb/articles?q=vpn", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app
        .call(Method::GET, "/kb/articles?q=vpn&includeDrafts=true", None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = app
        .call(Method::GET, "/kb/articles?includeDrafts=maybe", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_article() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/kb/articles",
            Some(json!({ "title": "Reset a password", "body": "Use the portal." })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["published"], true);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .call(Method::GET, &format!("/kb/articles/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["body"], "Use the portal.");

    let (status, _) = app.call(Method::GET, "/kb/articles/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call(Method::GET, "/kb/articles/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
