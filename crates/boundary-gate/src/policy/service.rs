use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::audit::{AuditEntry, AuditError, AuditSink};
use super::decision::{ActionRequest, Decision};
use super::error::PolicyError;
use super::ruleset::RuleSet;
use super::store::RuleStore;

/// Service composing the rule store, evaluator, and audit hook.
pub struct BoundaryService<A> {
    store: Arc<RuleStore>,
    audit: Arc<A>,
}

/// Decision plus the provenance an audit trail needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationReceipt {
    pub decision: Decision,
    pub ruleset_version: String,
    pub evaluated_at: DateTime<Utc>,
}

impl<A> BoundaryService<A>
where
    A: AuditSink + 'static,
{
    pub fn new(store: Arc<RuleStore>, audit: Arc<A>) -> Self {
        Self { store, audit }
    }

    /// Evaluate against the rule set active at call time and hand the result to the audit
    /// sink. An audit failure is reported as an error rather than returning the decision.
    pub fn evaluate(
        &self,
        request: ActionRequest,
    ) -> Result<EvaluationReceipt, BoundaryServiceError> {
        let evaluator = self.store.evaluator();
        let decision = evaluator.evaluate(&request)?;
        let ruleset_version = evaluator.rules().version().to_string();
        let evaluated_at = Utc::now();

        self.audit.record(AuditEntry {
            evaluated_at,
            ruleset_version: ruleset_version.clone(),
            request,
            decision: decision.clone(),
        })?;

        Ok(EvaluationReceipt {
            decision,
            ruleset_version,
            evaluated_at,
        })
    }

    pub fn rules(&self) -> Arc<RuleSet> {
        self.store.snapshot()
    }

    pub fn reload(&self) -> Result<Arc<RuleSet>, BoundaryServiceError> {
        Ok(self.store.reload()?)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>, BoundaryServiceError> {
        Ok(self.audit.recent(limit)?)
    }
}

/// Error raised by the boundary service.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryServiceError {
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}
