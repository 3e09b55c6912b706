use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::{ActionRequest, Decision};

/// One evaluated request as handed to the audit collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub evaluated_at: DateTime<Utc>,
    pub ruleset_version: String,
    pub request: ActionRequest,
    pub decision: Decision,
}

/// Outbound hook for the audit trail. Storage is the implementor's concern.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
    /// Most recent entries, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>, AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Sink that drops every entry, for callers with no audit trail.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardAudit;

impl AuditSink for DiscardAudit {
    fn record(&self, _entry: AuditEntry) -> Result<(), AuditError> {
        Ok(())
    }

    fn recent(&self, _limit: usize) -> Result<Vec<AuditEntry>, AuditError> {
        Ok(Vec::new())
    }
}
