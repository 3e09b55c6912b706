use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical form of free text: lowercase alphanumeric words separated by single spaces.
///
/// Every pattern in a [`RuleSet`](super::RuleSet) and every action description is reduced to
/// this shape before matching, so the matcher never has to reason about case, spacing, or
/// punctuation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|word| !word.is_empty())
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for NormalizedText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize(&raw))
    }
}

/// Trim, case-fold, drop apostrophes and invisible characters, turn any other punctuation into
/// a word break, and collapse runs of whitespace.
pub fn normalize(text: &str) -> NormalizedText {
    let mut folded = String::with_capacity(text.len());

    for ch in text.chars().flat_map(char::to_lowercase) {
        if is_elided(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            folded.push(ch);
        } else {
            folded.push(' ');
        }
    }

    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    NormalizedText(collapsed)
}

fn is_elided(ch: char) -> bool {
    matches!(
        ch,
        '\'' | '\u{2019}' | '\u{feff}' | '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{00ad}'
    )
}
