//! Rule repository: loads a rule document and converts it into a validated [`RuleSet`].
//!
//! Loading fails closed. The first structural or referential defect aborts the whole load and
//! no partially built rule set is ever returned.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use serde::{Serialize, Serializer};
use tracing::info;

use super::authority::{AuthorityChain, AuthorityLevel, SYSTEM_LEVEL};
use super::document::{AuthorityEntry, ContextEntry, RefusalEntry, RuleDocument, TriggerEntry};
use super::error::{PolicyError, ReferenceError, SchemaError};
use super::normalizer::{normalize, NormalizedText};
use super::reference::ReferencePath;

/// Marker in `applies_to` meaning "every context".
pub const WILDCARD: &str = "*";

const BUNDLED_RULES: &str = include_str!("../../rules/default_rules.json");

/// Named operating domain with its own restrictions, triggers, and delegated authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    pub id: String,
    pub label: String,
    pub description: String,
    pub non_permitted_actions: Vec<NormalizedText>,
    pub escalation_triggers: Vec<EscalationTrigger>,
    pub base_level: String,
}

/// Unconditional block. The description is matched first, then any keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Refusal {
    pub id: String,
    pub description: String,
    pub keywords: Vec<NormalizedText>,
    pub applies_to: Applicability,
    #[serde(skip)]
    description_pattern: NormalizedText,
}

impl Refusal {
    /// Patterns in match order: the normalized description, then keywords as declared.
    pub fn patterns(&self) -> impl Iterator<Item = &NormalizedText> {
        std::iter::once(&self.description_pattern).chain(self.keywords.iter())
    }

    pub fn applies_to_context(&self, context_id: &str) -> bool {
        self.applies_to.includes(context_id)
    }
}

/// Contexts a refusal covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    AllContexts,
    Contexts(BTreeSet<String>),
}

impl Applicability {
    pub fn includes(&self, context_id: &str) -> bool {
        match self {
            Applicability::AllContexts => true,
            Applicability::Contexts(ids) => ids.contains(context_id),
        }
    }
}

impl Serialize for Applicability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Applicability::AllContexts => serializer.collect_seq([WILDCARD]),
            Applicability::Contexts(ids) => serializer.collect_seq(ids),
        }
    }
}

/// Pattern that turns an otherwise admissible action into one needing confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscalationTrigger {
    pub pattern: NormalizedText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_level: Option<String>,
}

/// Entry a [`RuleReference`](super::RuleReference) resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTarget<'r> {
    MandatoryRefusal(&'r Refusal),
    GlobalRestrictions(&'r [NormalizedText]),
    ContextRestrictions(&'r Context),
    EscalationTrigger(&'r EscalationTrigger),
    DelegatedAuthority(&'r Context),
}

/// Immutable, validated rule set. Only obtainable through one of the `from_*` loaders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    version: String,
    contexts: Vec<Context>,
    global_non_permitted_actions: Vec<NormalizedText>,
    mandatory_refusals: Vec<Refusal>,
    authority_chain: AuthorityChain,
    escalation_triggers: Vec<EscalationTrigger>,
}

impl RuleSet {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| PolicyError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = Self::from_reader(file)?;
        info!(version = %rules.version, path = %path.display(), "rule set loaded");
        Ok(rules)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, PolicyError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, PolicyError> {
        let document: RuleDocument = serde_json::from_str(raw).map_err(SchemaError::from)?;
        Self::from_document(document)
    }

    /// Rule document compiled into the binary, used when no path is configured.
    pub fn bundled() -> Result<Self, PolicyError> {
        Self::from_json_str(BUNDLED_RULES)
    }

    fn from_document(document: RuleDocument) -> Result<Self, PolicyError> {
        let RuleDocument {
            version,
            contexts,
            global_non_permitted_actions,
            mandatory_refusals,
            authority_chain,
            escalation_triggers,
        } = document;

        let version = version.trim().to_string();
        if version.is_empty() {
            return Err(SchemaError::BlankVersion.into());
        }

        let authority_chain = build_authority_chain(authority_chain)?;
        let contexts = build_contexts(contexts, &authority_chain)?;
        let context_ids: HashSet<&str> = contexts.iter().map(|ctx| ctx.id.as_str()).collect();

        require_patterns(&global_non_permitted_actions, || {
            "global_non_permitted_actions".to_string()
        })?;

        let mandatory_refusals = build_refusals(mandatory_refusals, &context_ids)?;
        let escalation_triggers = build_triggers(
            escalation_triggers,
            "escalation_triggers",
            &authority_chain,
        )?;

        check_trigger_consistency(&contexts, &escalation_triggers)?;

        Ok(Self {
            version,
            contexts,
            global_non_permitted_actions,
            mandatory_refusals,
            authority_chain,
            escalation_triggers,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn context(&self, context_id: &str) -> Option<&Context> {
        self.contexts.iter().find(|ctx| ctx.id == context_id)
    }

    pub fn global_non_permitted_actions(&self) -> &[NormalizedText] {
        &self.global_non_permitted_actions
    }

    pub fn mandatory_refusals(&self) -> &[Refusal] {
        &self.mandatory_refusals
    }

    pub fn authority_chain(&self) -> &AuthorityChain {
        &self.authority_chain
    }

    pub fn escalation_triggers(&self) -> &[EscalationTrigger] {
        &self.escalation_triggers
    }

    /// Look up the entry a dotted rule reference points at.
    pub fn resolve(&self, reference: &str) -> Option<RuleTarget<'_>> {
        match ReferencePath::parse(reference)? {
            ReferencePath::MandatoryRefusal(id) => self
                .mandatory_refusals
                .iter()
                .find(|refusal| refusal.id == id)
                .map(RuleTarget::MandatoryRefusal),
            ReferencePath::GlobalRestrictions => Some(RuleTarget::GlobalRestrictions(
                &self.global_non_permitted_actions,
            )),
            ReferencePath::ContextRestrictions(id) => {
                self.context(id).map(RuleTarget::ContextRestrictions)
            }
            ReferencePath::DelegatedAuthority(id) => {
                self.context(id).map(RuleTarget::DelegatedAuthority)
            }
            ReferencePath::EscalationTrigger(pattern) => self
                .contexts
                .iter()
                .flat_map(|ctx| ctx.escalation_triggers.iter())
                .chain(self.escalation_triggers.iter())
                .find(|trigger| trigger.pattern.as_str() == pattern)
                .map(RuleTarget::EscalationTrigger),
        }
    }
}

fn build_authority_chain(entries: Vec<AuthorityEntry>) -> Result<AuthorityChain, SchemaError> {
    if entries.is_empty() {
        return Err(SchemaError::EmptyAuthorityChain);
    }

    let mut seen = HashSet::new();
    let mut levels = Vec::with_capacity(entries.len());

    for entry in entries {
        let level = require_text(entry.level, "authority_chain", "level")?;
        if level == SYSTEM_LEVEL {
            return Err(SchemaError::ReservedLevel(level));
        }
        if !seen.insert(level.clone()) {
            return Err(SchemaError::DuplicateId {
                kind: "authority level",
                id: level,
            });
        }

        require_patterns(&entry.can, || format!("authority_chain.{level}.can"))?;
        require_patterns(&entry.cannot, || format!("authority_chain.{level}.cannot"))?;

        if let Some(verb) = entry.can.iter().find(|verb| entry.cannot.contains(verb)) {
            return Err(SchemaError::ConflictingVerb {
                level,
                verb: verb.to_string(),
            });
        }

        levels.push(AuthorityLevel {
            level,
            can: entry.can,
            cannot: entry.cannot,
        });
    }

    Ok(AuthorityChain::from_levels(levels))
}

fn build_contexts(
    entries: Vec<ContextEntry>,
    chain: &AuthorityChain,
) -> Result<Vec<Context>, PolicyError> {
    let mut seen = HashSet::new();
    let mut contexts = Vec::with_capacity(entries.len());

    for entry in entries {
        let id = require_text(entry.id, "context", "id")?;
        if !seen.insert(id.clone()) {
            return Err(SchemaError::DuplicateId { kind: "context", id }.into());
        }
        let label = require_text(entry.label, "context", "label")?;

        require_patterns(&entry.non_permitted_actions, || {
            format!("contexts.{id}.non_permitted_actions")
        })?;

        let base_level = entry.base_level.trim().to_string();
        if !chain.contains(&base_level) {
            return Err(ReferenceError::UnknownLevel {
                location: format!("contexts.{id}.base_level"),
                level: base_level,
            }
            .into());
        }

        let escalation_triggers = build_triggers(
            entry.escalation_triggers,
            &format!("contexts.{id}.escalation_triggers"),
            chain,
        )?;

        contexts.push(Context {
            id,
            label,
            description: entry.description.trim().to_string(),
            non_permitted_actions: entry.non_permitted_actions,
            escalation_triggers,
            base_level,
        });
    }

    Ok(contexts)
}

fn build_refusals(
    entries: Vec<RefusalEntry>,
    context_ids: &HashSet<&str>,
) -> Result<Vec<Refusal>, PolicyError> {
    let mut seen = HashSet::new();
    let mut refusals = Vec::with_capacity(entries.len());

    for entry in entries {
        let id = require_text(entry.id, "mandatory refusal", "id")?;
        if !seen.insert(id.clone()) {
            return Err(SchemaError::DuplicateId {
                kind: "mandatory refusal",
                id,
            }
            .into());
        }

        let description = require_text(entry.description, "mandatory refusal", "description")?;
        let description_pattern = normalize(&description);
        if description_pattern.is_empty() {
            return Err(SchemaError::BlankPattern {
                location: format!("mandatory_refusals.{id}.description"),
            }
            .into());
        }
        require_patterns(&entry.keywords, || format!("mandatory_refusals.{id}.keywords"))?;

        let applies_to = build_applicability(&id, entry.applies_to, context_ids)?;

        refusals.push(Refusal {
            id,
            description,
            keywords: entry.keywords,
            applies_to,
            description_pattern,
        });
    }

    Ok(refusals)
}

fn build_applicability(
    refusal_id: &str,
    raw: Vec<String>,
    context_ids: &HashSet<&str>,
) -> Result<Applicability, PolicyError> {
    if raw.is_empty() {
        return Err(SchemaError::EmptyApplicability(refusal_id.to_string()).into());
    }

    let mut ids = BTreeSet::new();
    let mut wildcard = false;

    for entry in raw {
        let entry = entry.trim().to_string();
        if entry == WILDCARD {
            wildcard = true;
        } else if context_ids.contains(entry.as_str()) {
            ids.insert(entry);
        } else {
            return Err(ReferenceError::UnknownContext {
                refusal: refusal_id.to_string(),
                context_id: entry,
            }
            .into());
        }
    }

    if wildcard {
        Ok(Applicability::AllContexts)
    } else {
        Ok(Applicability::Contexts(ids))
    }
}

fn build_triggers(
    entries: Vec<TriggerEntry>,
    location: &str,
    chain: &AuthorityChain,
) -> Result<Vec<EscalationTrigger>, PolicyError> {
    let mut triggers = Vec::with_capacity(entries.len());

    for entry in entries {
        let (pattern, minimum_level) = entry.into_parts();
        if pattern.is_empty() {
            return Err(SchemaError::BlankPattern {
                location: location.to_string(),
            }
            .into());
        }

        let minimum_level = minimum_level.map(|level| level.trim().to_string());
        if let Some(level) = &minimum_level {
            if !chain.contains(level) {
                return Err(ReferenceError::UnknownLevel {
                    location: format!("{location}.{pattern}"),
                    level: level.clone(),
                }
                .into());
            }
        }

        triggers.push(EscalationTrigger {
            pattern,
            minimum_level,
        });
    }

    Ok(triggers)
}

/// `escalation_triggers.<pattern>` must identify one configured level wherever the pattern is
/// declared.
fn check_trigger_consistency(
    contexts: &[Context],
    global: &[EscalationTrigger],
) -> Result<(), SchemaError> {
    let mut levels: BTreeMap<&str, Option<&str>> = BTreeMap::new();

    let all = contexts
        .iter()
        .flat_map(|ctx| ctx.escalation_triggers.iter())
        .chain(global.iter());

    for trigger in all {
        let level = trigger.minimum_level.as_deref();
        match levels.get(trigger.pattern.as_str()) {
            Some(existing) if *existing != level => {
                return Err(SchemaError::ConflictingTrigger {
                    pattern: trigger.pattern.to_string(),
                });
            }
            Some(_) => {}
            None => {
                levels.insert(trigger.pattern.as_str(), level);
            }
        }
    }

    Ok(())
}

fn require_text(
    value: String,
    kind: &'static str,
    field: &'static str,
) -> Result<String, SchemaError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(SchemaError::BlankField { kind, field })
    } else {
        Ok(trimmed.to_string())
    }
}

fn require_patterns<F>(patterns: &[NormalizedText], location: F) -> Result<(), SchemaError>
where
    F: FnOnce() -> String,
{
    if patterns.iter().any(NormalizedText::is_empty) {
        return Err(SchemaError::BlankPattern {
            location: location(),
        });
    }
    Ok(())
}
