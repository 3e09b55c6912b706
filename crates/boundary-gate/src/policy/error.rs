use std::path::PathBuf;

/// Structural defects in a rule document. Any one of these aborts the whole load.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("rule document is malformed: {0}")]
    Document(#[from] serde_json::Error),
    #[error("rule document version must not be blank")]
    BlankVersion,
    #[error("{kind} entry has a blank `{field}`")]
    BlankField {
        kind: &'static str,
        field: &'static str,
    },
    #[error("{location} declares a pattern that is blank after normalization")]
    BlankPattern { location: String },
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("authority chain must declare at least one level")]
    EmptyAuthorityChain,
    #[error("authority level name '{0}' is reserved")]
    ReservedLevel(String),
    #[error("authority level '{level}' lists '{verb}' as both permitted and forbidden")]
    ConflictingVerb { level: String, verb: String },
    #[error("mandatory refusal '{0}' does not apply to any context")]
    EmptyApplicability(String),
    #[error("escalation trigger '{pattern}' is declared with conflicting minimum levels")]
    ConflictingTrigger { pattern: String },
}

/// A rule points at a context or authority level the document never defines.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("mandatory refusal '{refusal}' applies to unknown context '{context_id}'")]
    UnknownContext { refusal: String, context_id: String },
    #[error("{location} references unknown authority level '{level}'")]
    UnknownLevel { location: String, level: String },
}

/// Caller asked for a context the active rule set does not define.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("context '{context_id}' is not defined in rule set {version}")]
pub struct ContextNotFoundError {
    pub context_id: String,
    pub version: String,
}

/// The request itself is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("action text must not be blank")]
    BlankAction,
}

/// Every failure the policy layer reports. None of these are retried, and none of them may be
/// read as an admissible outcome.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to open rule document {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read rule document: {0}")]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    ContextNotFound(#[from] ContextNotFoundError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PolicyError {
    /// Short machine-readable label used in API error bodies and audit logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PolicyError::Open { .. } | PolicyError::Read(_) => "io_error",
            PolicyError::Schema(_) => "schema_error",
            PolicyError::Reference(_) => "reference_error",
            PolicyError::ContextNotFound(_) => "context_not_found",
            PolicyError::Validation(_) => "validation_error",
        }
    }
}
