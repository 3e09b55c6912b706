//! Wire shape of the versioned rule document.
//!
//! These types only describe what may appear in the JSON. They are converted into the typed
//! [`RuleSet`](super::RuleSet) by the repository, which owns every structural and referential
//! check. Unknown fields are rejected here so typos never silently disable a rule.

use super::normalizer::NormalizedText;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RuleDocument {
    pub(crate) version: String,
    pub(crate) contexts: Vec<ContextEntry>,
    pub(crate) global_non_permitted_actions: Vec<NormalizedText>,
    pub(crate) mandatory_refusals: Vec<RefusalEntry>,
    pub(crate) authority_chain: Vec<AuthorityEntry>,
    pub(crate) escalation_triggers: Vec<TriggerEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ContextEntry {
    pub(crate) id: String,
    pub(crate) label: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) non_permitted_actions: Vec<NormalizedText>,
    #[serde(default)]
    pub(crate) escalation_triggers: Vec<TriggerEntry>,
    pub(crate) base_level: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RefusalEntry {
    pub(crate) id: String,
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) keywords: Vec<NormalizedText>,
    pub(crate) applies_to: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AuthorityEntry {
    pub(crate) level: String,
    #[serde(default)]
    pub(crate) can: Vec<NormalizedText>,
    #[serde(default)]
    pub(crate) cannot: Vec<NormalizedText>,
}

/// Either `"active frontline"` or `{ "pattern": "active frontline", "minimum_level": "..." }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TriggerEntry {
    Pattern(NormalizedText),
    Detailed(DetailedTrigger),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DetailedTrigger {
    pub(crate) pattern: NormalizedText,
    #[serde(default)]
    pub(crate) minimum_level: Option<String>,
}

impl TriggerEntry {
    pub(crate) fn into_parts(self) -> (NormalizedText, Option<String>) {
        match self {
            TriggerEntry::Pattern(pattern) => (pattern, None),
            TriggerEntry::Detailed(detail) => (detail.pattern, detail.minimum_level),
        }
    }
}
