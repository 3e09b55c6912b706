use super::matcher::Matcher;
use super::normalizer::NormalizedText;
use serde::Serialize;

/// Level name used for refusals that come from the rules themselves rather than a tier.
pub const SYSTEM_LEVEL: &str = "system";

/// One tier of the authority chain and the verbs it may or may not exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorityLevel {
    pub level: String,
    pub can: Vec<NormalizedText>,
    pub cannot: Vec<NormalizedText>,
}

impl AuthorityLevel {
    /// `Some(false)` when a forbidden verb occurs in the action, `Some(true)` when only a
    /// permitted verb does, `None` when the level says nothing about it.
    pub fn permits(&self, action: &NormalizedText) -> Option<bool> {
        let matcher = Matcher::new(action);
        if matcher.first_match(&self.cannot).is_some() {
            return Some(false);
        }
        if matcher.first_match(&self.can).is_some() {
            return Some(true);
        }
        None
    }
}

/// Ordered authority tiers, lowest rank first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuthorityChain {
    levels: Vec<AuthorityLevel>,
}

impl AuthorityChain {
    /// Callers must pass at least one level; the repository rejects empty chains first.
    pub(crate) fn from_levels(levels: Vec<AuthorityLevel>) -> Self {
        debug_assert!(!levels.is_empty(), "authority chain must not be empty");
        Self { levels }
    }

    pub fn levels(&self) -> &[AuthorityLevel] {
        &self.levels
    }

    pub fn get(&self, level: &str) -> Option<&AuthorityLevel> {
        self.levels.iter().find(|entry| entry.level == level)
    }

    pub fn contains(&self, level: &str) -> bool {
        self.get(level).is_some()
    }

    /// Zero-based rank; higher means more authority.
    pub fn rank(&self, level: &str) -> Option<usize> {
        self.levels.iter().position(|entry| entry.level == level)
    }

    pub fn lowest(&self) -> &AuthorityLevel {
        &self.levels[0]
    }

    pub fn highest(&self) -> &AuthorityLevel {
        &self.levels[self.levels.len() - 1]
    }

    /// Lowest tier whose permitted verbs cover the action without any forbidden verb
    /// applying. Informational only; decisions never consult it.
    pub fn first_permitting(&self, action: &NormalizedText) -> Option<&AuthorityLevel> {
        self.levels
            .iter()
            .find(|entry| entry.permits(action) == Some(true))
    }
}
