use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::{json, Value};

use crate::policy::audit::{AuditEntry, AuditError, AuditSink};
use crate::policy::{
    boundary_router, ActionRequest, BoundaryService, Decision, Evaluator, RuleSet, RuleSource,
    RuleStore,
};

/// Minimal document mirroring the acceptance scenarios.
pub(super) fn scenario_document() -> Value {
    json!({
        "version": "test-1",
        "contexts": [
            {
                "id": "logistics",
                "label": "Logistics",
                "description": "Routing of relief supplies",
                "non_permitted_actions": ["unescorted convoy"],
                "escalation_triggers": [
                    { "pattern": "cross border", "minimum_level": "program_manager" }
                ],
                "base_level": "field_officer"
            },
            {
                "id": "reconstruction",
                "label": "Reconstruction",
                "non_permitted_actions": ["demolish occupied"],
                "base_level": "program_manager"
            }
        ],
        "global_non_permitted_actions": ["political advantage", "bribe"],
        "mandatory_refusals": [
            {
                "id": "lethal_force",
                "description": "Authorize lethal force",
                "applies_to": ["*"]
            },
            {
                "id": "convoy_weapons",
                "description": "Carry weapons in convoy",
                "keywords": ["arm the convoy"],
                "applies_to": ["logistics"]
            }
        ],
        "authority_chain": [
            { "level": "field_officer", "can": ["distribute"], "cannot": ["sign contract"] },
            { "level": "program_manager", "can": ["propose", "sign contract"] },
            { "level": "regional_director", "can": ["approve route"] },
            { "level": "governing_board", "can": ["amend policy"] }
        ],
        "escalation_triggers": [
            { "pattern": "active frontline", "minimum_level": "regional_director" },
            "suspend operations"
        ]
    })
}

pub(super) fn scenario_rules() -> RuleSet {
    RuleSet::from_json_str(&scenario_document().to_string()).expect("scenario rules load")
}

pub(super) fn evaluator() -> Evaluator {
    Evaluator::new(Arc::new(scenario_rules()))
}

pub(super) fn evaluate(action: &str, context_id: &str) -> Decision {
    evaluator()
        .evaluate(&ActionRequest::new(action, context_id))
        .expect("evaluation succeeds")
}

/// Load a mutated copy of the scenario document.
pub(super) fn load_with<F>(mutate: F) -> Result<RuleSet, crate::policy::PolicyError>
where
    F: FnOnce(&mut Value),
{
    let mut document = scenario_document();
    mutate(&mut document);
    RuleSet::from_json_str(&document.to_string())
}

#[derive(Default, Clone)]
pub(super) struct MemoryAudit {
    pub(super) entries: Arc<Mutex<VecDeque<AuditEntry>>>,
}

impl AuditSink for MemoryAudit {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push_front(entry);
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>, AuditError> {
        let guard = self.entries.lock().expect("audit mutex poisoned");
        Ok(guard.iter().take(limit).cloned().collect())
    }
}

pub(super) struct UnavailableAudit;

impl AuditSink for UnavailableAudit {
    fn record(&self, _entry: AuditEntry) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<AuditEntry>, AuditError> {
        Err(AuditError::Unavailable("offline".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<BoundaryService<MemoryAudit>>, MemoryAudit) {
    let store = Arc::new(RuleStore::new(scenario_rules(), RuleSource::Bundled));
    let audit = MemoryAudit::default();
    let service = Arc::new(BoundaryService::new(store, Arc::new(audit.clone())));
    (service, audit)
}

pub(super) fn router_with_service(service: Arc<BoundaryService<MemoryAudit>>) -> axum::Router {
    boundary_router(service)
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}
