//! Whole-word phrase matching over [`NormalizedText`].
//!
//! A pattern matches when its words appear contiguously in the action text, so `"force"`
//! matches `"authorize lethal force"` but not `"forced labour audit"`. Pattern lists are
//! scanned in declared order and the first hit wins; nothing here ranks or scores matches.

use super::normalizer::NormalizedText;

/// Successful lookup of a pattern within an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch<'p> {
    /// Position of the pattern in the list it was declared in.
    pub index: usize,
    pub pattern: &'p NormalizedText,
}

/// Pre-split view of one action description, reused across every pattern list of an
/// evaluation.
#[derive(Debug, Clone)]
pub struct Matcher<'t> {
    words: Vec<&'t str>,
}

impl<'t> Matcher<'t> {
    pub fn new(text: &'t NormalizedText) -> Self {
        Self {
            words: text.words().collect(),
        }
    }

    /// Whether `phrase` occurs in the text on word boundaries.
    pub fn contains(&self, phrase: &NormalizedText) -> bool {
        let needle: Vec<&str> = phrase.words().collect();
        if needle.is_empty() || needle.len() > self.words.len() {
            return false;
        }

        self.words
            .windows(needle.len())
            .any(|window| window == needle.as_slice())
    }

    /// First pattern, in iteration order, that occurs in the text.
    pub fn first_match<'p, I>(&self, patterns: I) -> Option<PatternMatch<'p>>
    where
        I: IntoIterator<Item = &'p NormalizedText>,
    {
        patterns
            .into_iter()
            .enumerate()
            .find(|(_, pattern)| self.contains(pattern))
            .map(|(index, pattern)| PatternMatch { index, pattern })
    }

    /// First item, in slice order, whose pattern occurs in the text.
    pub fn first_item<'p, T, F>(&self, items: &'p [T], pattern_of: F) -> Option<&'p T>
    where
        F: Fn(&T) -> &NormalizedText,
    {
        items.iter().find(|item| self.contains(pattern_of(item)))
    }
}

/// Test `text` against an ordered pattern list; the earliest declared match wins.
pub fn matches<'p>(
    text: &NormalizedText,
    patterns: &'p [NormalizedText],
) -> Option<PatternMatch<'p>> {
    Matcher::new(text).first_match(patterns)
}
