use std::sync::Arc;

use tracing::debug;

use super::decision::{format_decision, ActionRequest, Decision, Verdict};
use super::error::{ContextNotFoundError, PolicyError, ValidationError};
use super::matcher::Matcher;
use super::normalizer::{normalize, NormalizedText};
use super::ruleset::{Context, EscalationTrigger, RuleSet};

/// Runs the boundary pipeline against one immutable rule set.
///
/// A blank action is rejected first, then the context id is looked up exactly as given. After
/// that the first decisive step wins: mandatory refusals, global restrictions, context
/// restrictions, escalation triggers (context-scoped before global), then delegated authority.
/// Evaluation performs no I/O and holds no state between calls.
#[derive(Debug, Clone)]
pub struct Evaluator {
    rules: Arc<RuleSet>,
}

impl Evaluator {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn evaluate(&self, request: &ActionRequest) -> Result<Decision, PolicyError> {
        let verdict = self.verdict(request)?;
        let decision = format_decision(&verdict);
        debug!(
            context_id = %request.context_id,
            status = decision.status.as_str(),
            rule_reference = %decision.rule_reference,
            "boundary evaluated"
        );
        Ok(decision)
    }

    pub fn verdict(&self, request: &ActionRequest) -> Result<Verdict<'_>, PolicyError> {
        let rules = self.rules.as_ref();

        let action = normalize(&request.action);
        if action.is_empty() {
            return Err(ValidationError::BlankAction.into());
        }

        let context = rules
            .context(&request.context_id)
            .ok_or_else(|| ContextNotFoundError {
                context_id: request.context_id.clone(),
                version: rules.version().to_string(),
            })?;

        let matcher = Matcher::new(&action);

        if let Some(refusal) = rules
            .mandatory_refusals()
            .iter()
            .filter(|refusal| refusal.applies_to_context(&context.id))
            .find(|refusal| matcher.first_match(refusal.patterns()).is_some())
        {
            return Ok(Verdict::Refused(refusal));
        }

        if let Some(hit) = matcher.first_match(rules.global_non_permitted_actions()) {
            return Ok(Verdict::GloballyRestricted {
                pattern: hit.pattern,
            });
        }

        if let Some(hit) = matcher.first_match(&context.non_permitted_actions) {
            return Ok(Verdict::ContextRestricted {
                context,
                pattern: hit.pattern,
            });
        }

        if let Some(trigger) = self.matching_trigger(&matcher, context) {
            let level = trigger
                .minimum_level
                .as_deref()
                .and_then(|name| rules.authority_chain().get(name))
                .unwrap_or_else(|| rules.authority_chain().highest());

            return Ok(Verdict::Escalate { trigger, level });
        }

        let level = rules
            .authority_chain()
            .get(&context.base_level)
            .unwrap_or_else(|| rules.authority_chain().highest());

        Ok(Verdict::Delegated { context, level })
    }

    fn matching_trigger<'r>(
        &'r self,
        matcher: &Matcher<'_>,
        context: &'r Context,
    ) -> Option<&'r EscalationTrigger> {
        matcher
            .first_item(&context.escalation_triggers, trigger_pattern)
            .or_else(|| matcher.first_item(self.rules.escalation_triggers(), trigger_pattern))
    }
}

fn trigger_pattern(trigger: &EscalationTrigger) -> &NormalizedText {
    &trigger.pattern
}
