//! Boundary evaluation: decides whether a described action is admissible, needs escalation to
//! a higher authority, or is refused outright, and names the single rule responsible.
//!
//! Matching is literal. Patterns are compared as whole words against normalized text, so the
//! evaluator does not understand paraphrase or negation ("do not authorize lethal force" still
//! matches the lethal-force refusal). Rule documents should be written with that in mind.

pub mod audit;
pub mod authority;
mod document;
pub mod decision;
pub mod error;
pub mod evaluator;
pub mod matcher;
pub mod normalizer;
pub mod reference;
pub mod router;
pub mod ruleset;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use audit::{AuditEntry, AuditError, AuditSink, DiscardAudit};
pub use authority::{AuthorityChain, AuthorityLevel, SYSTEM_LEVEL};
pub use decision::{format_decision, ActionRequest, Decision, DecisionStatus, Verdict};
pub use error::{ContextNotFoundError, PolicyError, ReferenceError, SchemaError, ValidationError};
pub use evaluator::Evaluator;
pub use matcher::{matches, Matcher, PatternMatch};
pub use normalizer::{normalize, NormalizedText};
pub use reference::{ReferencePath, RuleReference};
pub use router::boundary_router;
pub use ruleset::{Applicability, Context, EscalationTrigger, Refusal, RuleSet, RuleTarget};
pub use service::{BoundaryService, BoundaryServiceError, EvaluationReceipt};
pub use store::{RuleSource, RuleStore};
