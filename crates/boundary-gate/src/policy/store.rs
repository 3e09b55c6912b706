use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{info, warn};

use super::error::PolicyError;
use super::evaluator::Evaluator;
use super::ruleset::RuleSet;

/// Where the active rule document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Bundled,
    Path(PathBuf),
}

impl RuleSource {
    pub fn from_optional_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::Path(path),
            None => Self::Bundled,
        }
    }

    pub fn load(&self) -> Result<RuleSet, PolicyError> {
        match self {
            RuleSource::Bundled => RuleSet::bundled(),
            RuleSource::Path(path) => RuleSet::from_path(path),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            RuleSource::Bundled => "bundled rule document".to_string(),
            RuleSource::Path(path) => path.display().to_string(),
        }
    }
}

/// Holder of the active rule set.
///
/// Readers take an `Arc` snapshot and keep it for the whole evaluation. A reload parses and
/// validates the replacement completely before a single atomic swap, so a reader sees either
/// the old set or the new one and a failed reload leaves the old set in place.
#[derive(Debug)]
pub struct RuleStore {
    active: ArcSwap<RuleSet>,
    source: RuleSource,
}

impl RuleStore {
    pub fn new(rules: RuleSet, source: RuleSource) -> Self {
        Self {
            active: ArcSwap::from_pointee(rules),
            source,
        }
    }

    pub fn open(source: RuleSource) -> Result<Self, PolicyError> {
        let rules = source.load()?;
        info!(version = rules.version(), source = %source.describe(), "boundary rules active");
        Ok(Self::new(rules, source))
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.active.load_full()
    }

    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.snapshot())
    }

    /// Re-read the configured source and swap it in once fully validated.
    pub fn reload(&self) -> Result<Arc<RuleSet>, PolicyError> {
        match self.source.load() {
            Ok(rules) => Ok(self.replace(rules)),
            Err(err) => {
                warn!(
                    source = %self.source.describe(),
                    error = %err,
                    "rule reload rejected, keeping active rule set"
                );
                Err(err)
            }
        }
    }

    /// Swap in an already validated rule set, returning it.
    pub fn replace(&self, rules: RuleSet) -> Arc<RuleSet> {
        let next = Arc::new(rules);
        let previous = self.active.swap(Arc::clone(&next));
        info!(
            previous = previous.version(),
            version = next.version(),
            "boundary rules swapped"
        );
        next
    }
}
