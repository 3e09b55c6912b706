use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::policy::router::evaluate_handler;
use crate::policy::{ActionRequest, BoundaryService, RuleSource, RuleStore};

fn evaluate_request(body: serde_json::Value) -> Request<Body> {
    Request::post("/api/v1/boundary/evaluate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn evaluate_route_returns_decision_envelope() {
    let (service, audit) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(evaluate_request(json!({
            "action": "route shipment through active frontline",
            "context_id": "logistics",
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["decision"]["status"], "escalation_required");
    assert_eq!(
        body["decision"]["rule_reference"],
        "escalation_triggers.active frontline"
    );
    assert_eq!(body["decision"]["level"], "regional_director");
    assert_eq!(body["ruleset_version"], "test-1");
    assert!(body["evaluated_at"].is_string());

    let recorded = audit.entries.lock().expect("audit mutex poisoned");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].request.context_id, "logistics");
}

#[tokio::test]
async fn evaluate_route_reports_unknown_context_as_not_found() {
    let (service, audit) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(evaluate_request(json!({
            "action": "distribute water",
            "context_id": "maritime",
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "context_not_found");
    assert!(body.get("decision").is_none());
    assert!(audit.entries.lock().expect("audit mutex poisoned").is_empty());
}

#[tokio::test]
async fn evaluate_route_rejects_incomplete_body_as_json() {
    let (service, audit) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(evaluate_request(json!({ "action": "distribute water" })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "validation_error");
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("context_id")));
    assert!(audit.entries.lock().expect("audit mutex poisoned").is_empty());
}

#[tokio::test]
async fn evaluate_handler_rejects_blank_action() {
    let (service, _) = build_service();

    let response = evaluate_handler::<MemoryAudit>(
        State(service),
        Ok(axum::Json(ActionRequest::new("   ", "logistics"))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "validation_error");
}

#[tokio::test]
async fn evaluate_handler_fails_closed_when_audit_is_down() {
    let store = Arc::new(RuleStore::new(scenario_rules(), RuleSource::Bundled));
    let service = Arc::new(BoundaryService::new(store, Arc::new(UnavailableAudit)));

    let response = evaluate_handler::<UnavailableAudit>(
        State(service),
        Ok(axum::Json(ActionRequest::new(
            "propose a reconstruction project ranking",
            "reconstruction",
        ))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "audit_error");
}

#[tokio::test]
async fn rules_route_exposes_active_rule_set() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/boundary/rules")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["version"], "test-1");
    assert_eq!(body["mandatory_refusals"][0]["applies_to"], json!(["*"]));
    assert_eq!(body["authority_chain"][0]["level"], "field_officer");
}

#[tokio::test]
async fn authority_route_reports_first_permitting_level() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/boundary/authority?action=sign%20contract%20for%20fuel")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["first_permitting_level"], "program_manager");
    assert_eq!(body["levels"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn reload_route_swaps_in_bundled_rules() {
    let (service, _) = build_service();
    let router = router_with_service(Arc::clone(&service));

    let response = router
        .oneshot(
            Request::post("/api/v1/boundary/rules/reload")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "reloaded");
    assert_ne!(body["ruleset_version"], "test-1");
    assert_ne!(service.rules().version(), "test-1");
}

#[tokio::test]
async fn reload_route_keeps_old_rules_on_failure() {
    let missing = std::env::temp_dir().join("boundary-gate-routing-missing.json");
    let store = Arc::new(RuleStore::new(scenario_rules(), RuleSource::Path(missing)));
    let service = Arc::new(BoundaryService::new(store, Arc::new(MemoryAudit::default())));
    let router = router_with_service(Arc::clone(&service));

    let response = router
        .oneshot(
            Request::post("/api/v1/boundary/rules/reload")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(service.rules().version(), "test-1");
}

#[tokio::test]
async fn reload_route_rejects_invalid_document_and_keeps_rules() {
    let dangling = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("dangling_refusal_scope.json");
    let store = Arc::new(RuleStore::new(scenario_rules(), RuleSource::Path(dangling)));
    let service = Arc::new(BoundaryService::new(store, Arc::new(MemoryAudit::default())));
    let before = service.rules();
    let router = router_with_service(Arc::clone(&service));

    let response = router
        .oneshot(
            Request::post("/api/v1/boundary/rules/reload")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "reference_error");
    assert!(Arc::ptr_eq(&before, &service.rules()));
}

#[tokio::test]
async fn audit_route_lists_newest_first() {
    let (service, _) = build_service();
    service
        .evaluate(ActionRequest::new("distribute blankets", "logistics"))
        .expect("first evaluation");
    service
        .evaluate(ActionRequest::new("authorize lethal force", "logistics"))
        .expect("second evaluation");
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/boundary/audit?limit=1")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let entries = body.as_array().expect("array body");
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0]["decision"]["rule_reference"],
        "mandatory_refusals.lethal_force"
    );
}
