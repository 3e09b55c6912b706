use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::audit::AuditSink;
use super::authority::AuthorityLevel;
use super::decision::ActionRequest;
use super::error::PolicyError;
use super::normalizer::normalize;
use super::service::{BoundaryService, BoundaryServiceError};

const DEFAULT_AUDIT_LIMIT: usize = 50;

/// Router builder exposing evaluation, rule inspection, and admin reload endpoints.
pub fn boundary_router<A>(service: Arc<BoundaryService<A>>) -> Router
where
    A: AuditSink + 'static,
{
    Router::new()
        .route("/api/v1/boundary/evaluate", post(evaluate_handler::<A>))
        .route("/api/v1/boundary/rules", get(rules_handler::<A>))
        .route("/api/v1/boundary/rules/reload", post(reload_handler::<A>))
        .route("/api/v1/boundary/authority", get(authority_handler::<A>))
        .route("/api/v1/boundary/audit", get(audit_handler::<A>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthorityQuery {
    #[serde(default)]
    pub(crate) action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuditQuery {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuthorityView<'r> {
    pub(crate) ruleset_version: &'r str,
    pub(crate) levels: &'r [AuthorityLevel],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) first_permitting_level: Option<&'r str>,
}

pub(crate) async fn evaluate_handler<A>(
    State(service): State<Arc<BoundaryService<A>>>,
    payload: Result<axum::Json<ActionRequest>, JsonRejection>,
) -> Response
where
    A: AuditSink + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.evaluate(request) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rules_handler<A>(State(service): State<Arc<BoundaryService<A>>>) -> Response
where
    A: AuditSink + 'static,
{
    let rules = service.rules();
    (StatusCode::OK, axum::Json(rules.as_ref())).into_response()
}

pub(crate) async fn reload_handler<A>(State(service): State<Arc<BoundaryService<A>>>) -> Response
where
    A: AuditSink + 'static,
{
    match service.reload() {
        Ok(rules) => {
            let payload = json!({
                "status": "reloaded",
                "ruleset_version": rules.version(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn authority_handler<A>(
    State(service): State<Arc<BoundaryService<A>>>,
    Query(query): Query<AuthorityQuery>,
) -> Response
where
    A: AuditSink + 'static,
{
    let rules = service.rules();
    let chain = rules.authority_chain();
    let action = query.action.filter(|value| !value.trim().is_empty());
    let first_permitting_level = action.as_deref().and_then(|value| {
        chain
            .first_permitting(&normalize(value))
            .map(|level| level.level.as_str())
    });

    let view = AuthorityView {
        ruleset_version: rules.version(),
        levels: chain.levels(),
        action,
        first_permitting_level,
    };
    (StatusCode::OK, axum::Json(view)).into_response()
}

pub(crate) async fn audit_handler<A>(
    State(service): State<Arc<BoundaryService<A>>>,
    Query(query): Query<AuditQuery>,
) -> Response
where
    A: AuditSink + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT);
    match service.recent(limit) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
        "kind": "validation_error",
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

fn error_response(error: BoundaryServiceError) -> Response {
    let (status, kind) = match &error {
        BoundaryServiceError::Policy(policy) => {
            let status = match policy {
                PolicyError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PolicyError::ContextNotFound(_) => StatusCode::NOT_FOUND,
                PolicyError::Schema(_) | PolicyError::Reference(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PolicyError::Open { .. } | PolicyError::Read(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, policy.kind())
        }
        BoundaryServiceError::Audit(_) => (StatusCode::INTERNAL_SERVER_ERROR, "audit_error"),
    };

    let payload = json!({
        "error": error.to_string(),
        "kind": kind,
    });
    (status, axum::Json(payload)).into_response()
}
