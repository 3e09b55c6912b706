use serde::{Deserialize, Serialize};
use std::fmt;

const MANDATORY_REFUSALS: &str = "mandatory_refusals";
const GLOBAL_NON_PERMITTED: &str = "global_non_permitted_actions";
const ESCALATION_TRIGGERS: &str = "escalation_triggers";
const CONTEXTS: &str = "contexts";
const NON_PERMITTED_SUFFIX: &str = "non_permitted_actions";
const DELEGATED_SUFFIX: &str = "delegated_authority";

/// Stable dotted pointer into a rule document, e.g. `mandatory_refusals.lethal_force`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleReference(String);

impl RuleReference {
    pub fn mandatory_refusal(refusal_id: &str) -> Self {
        Self(format!("{MANDATORY_REFUSALS}.{refusal_id}"))
    }

    pub fn global_restrictions() -> Self {
        Self(GLOBAL_NON_PERMITTED.to_string())
    }

    pub fn context_restrictions(context_id: &str) -> Self {
        Self(format!("{CONTEXTS}.{context_id}.{NON_PERMITTED_SUFFIX}"))
    }

    pub fn escalation_trigger(pattern: &str) -> Self {
        Self(format!("{ESCALATION_TRIGGERS}.{pattern}"))
    }

    pub fn delegated_authority(context_id: &str) -> Self {
        Self(format!("{CONTEXTS}.{context_id}.{DELEGATED_SUFFIX}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the reference back into the section it addresses.
    pub fn parse(&self) -> Option<ReferencePath<'_>> {
        ReferencePath::parse(&self.0)
    }
}

impl fmt::Display for RuleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RuleReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Structured reading of a dotted reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePath<'a> {
    MandatoryRefusal(&'a str),
    GlobalRestrictions,
    ContextRestrictions(&'a str),
    EscalationTrigger(&'a str),
    DelegatedAuthority(&'a str),
}

impl<'a> ReferencePath<'a> {
    pub fn parse(raw: &'a str) -> Option<Self> {
        if raw == GLOBAL_NON_PERMITTED {
            return Some(Self::GlobalRestrictions);
        }

        let (section, rest) = raw.split_once('.')?;
        if rest.is_empty() {
            return None;
        }

        match section {
            MANDATORY_REFUSALS => Some(Self::MandatoryRefusal(rest)),
            ESCALATION_TRIGGERS => Some(Self::EscalationTrigger(rest)),
            CONTEXTS => {
                // context ids may themselves contain dots, so split from the right
                let (context_id, suffix) = rest.rsplit_once('.')?;
                if context_id.is_empty() {
                    return None;
                }
                match suffix {
                    NON_PERMITTED_SUFFIX => Some(Self::ContextRestrictions(context_id)),
                    DELEGATED_SUFFIX => Some(Self::DelegatedAuthority(context_id)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_produce_documented_shapes() {
        assert_eq!(
            RuleReference::mandatory_refusal("lethal_force").as_str(),
            "mandatory_refusals.lethal_force"
        );
        assert_eq!(
            RuleReference::global_restrictions().as_str(),
            "global_non_permitted_actions"
        );
        assert_eq!(
            RuleReference::context_restrictions("logistics").as_str(),
            "contexts.logistics.non_permitted_actions"
        );
        assert_eq!(
            RuleReference::escalation_trigger("active frontline").as_str(),
            "escalation_triggers.active frontline"
        );
        assert_eq!(
            RuleReference::delegated_authority("reconstruction").as_str(),
            "contexts.reconstruction.delegated_authority"
        );
    }

    #[test]
    fn parse_reads_every_constructor_back() {
        let cases = [
            (
                RuleReference::mandatory_refusal("lethal_force"),
                ReferencePath::MandatoryRefusal("lethal_force"),
            ),
            (
                RuleReference::global_restrictions(),
                ReferencePath::GlobalRestrictions,
            ),
            (
                RuleReference::context_restrictions("north.sector"),
                ReferencePath::ContextRestrictions("north.sector"),
            ),
            (
                RuleReference::escalation_trigger("active frontline"),
                ReferencePath::EscalationTrigger("active frontline"),
            ),
            (
                RuleReference::delegated_authority("logistics"),
                ReferencePath::DelegatedAuthority("logistics"),
            ),
        ];

        for (reference, expected) in &cases {
            assert_eq!(reference.parse(), Some(*expected), "{reference}");
        }
    }

    #[test]
    fn parse_rejects_unknown_sections() {
        assert!(ReferencePath::parse("authority_chain.field_officer").is_none());
        assert!(ReferencePath::parse("contexts.logistics.label").is_none());
        assert!(ReferencePath::parse("mandatory_refusals.").is_none());
        assert!(ReferencePath::parse("").is_none());
    }
}
