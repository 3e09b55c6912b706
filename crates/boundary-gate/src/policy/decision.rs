use serde::{Deserialize, Serialize};

use super::authority::{AuthorityLevel, SYSTEM_LEVEL};
use super::normalizer::NormalizedText;
use super::reference::RuleReference;
use super::ruleset::{Context, EscalationTrigger, Refusal};

/// Reason attached to every admissible decision.
pub const DELEGATED_REASON: &str = "within delegated authority";

/// Proposed action and the context it would be taken in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    pub context_id: String,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            context_id: context_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Admissible,
    EscalationRequired,
    Inadmissible,
}

impl DecisionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionStatus::Admissible => "admissible",
            DecisionStatus::EscalationRequired => "escalation_required",
            DecisionStatus::Inadmissible => "inadmissible",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DecisionStatus::Admissible => "Admissible",
            DecisionStatus::EscalationRequired => "Escalation required",
            DecisionStatus::Inadmissible => "Inadmissible",
        }
    }
}

/// External four-field result of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub status: DecisionStatus,
    pub reason: String,
    pub rule_reference: RuleReference,
    pub level: String,
}

/// Internal outcome of the pipeline: which rule fired, borrowed from the rule set it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'r> {
    Refused(&'r Refusal),
    GloballyRestricted {
        pattern: &'r NormalizedText,
    },
    ContextRestricted {
        context: &'r Context,
        pattern: &'r NormalizedText,
    },
    Escalate {
        trigger: &'r EscalationTrigger,
        level: &'r AuthorityLevel,
    },
    Delegated {
        context: &'r Context,
        level: &'r AuthorityLevel,
    },
}

impl Verdict<'_> {
    pub fn status(&self) -> DecisionStatus {
        match self {
            Verdict::Refused(_)
            | Verdict::GloballyRestricted { .. }
            | Verdict::ContextRestricted { .. } => DecisionStatus::Inadmissible,
            Verdict::Escalate { .. } => DecisionStatus::EscalationRequired,
            Verdict::Delegated { .. } => DecisionStatus::Admissible,
        }
    }
}

/// Project a verdict into the external decision shape. No matching happens here.
pub fn format_decision(verdict: &Verdict<'_>) -> Decision {
    let status = verdict.status();
    let (reason, rule_reference, level) = match verdict {
        Verdict::Refused(refusal) => (
            refusal.description.clone(),
            RuleReference::mandatory_refusal(&refusal.id),
            SYSTEM_LEVEL.to_string(),
        ),
        Verdict::GloballyRestricted { pattern } => (
            format!("action matches globally non-permitted action '{pattern}'"),
            RuleReference::global_restrictions(),
            SYSTEM_LEVEL.to_string(),
        ),
        Verdict::ContextRestricted { context, pattern } => (
            format!(
                "action matches non-permitted action '{pattern}' in {} context",
                context.label
            ),
            RuleReference::context_restrictions(&context.id),
            SYSTEM_LEVEL.to_string(),
        ),
        Verdict::Escalate { trigger, level } => (
            format!(
                "'{}' requires confirmation by {} or higher",
                trigger.pattern, level.level
            ),
            RuleReference::escalation_trigger(trigger.pattern.as_str()),
            level.level.clone(),
        ),
        Verdict::Delegated { context, level } => (
            DELEGATED_REASON.to_string(),
            RuleReference::delegated_authority(&context.id),
            level.level.clone(),
        ),
    };

    Decision {
        status,
        reason,
        rule_reference,
        level,
    }
}
