//! Plain text cleanup.
//!
//! [`TextCleaner`] strips residual boilerplate phrases (paywall prompts,
//! consent notices, photo credits, timestamps) from extracted text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::rules::RuleSet;

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank line pattern should compile"));

/// Applies the strip rules of a [`RuleSet`] to plain text.
///
/// # Example
///
/// ```rust
/// use newsdesk_core::{RuleSet, TextCleaner};
///
/// let rules = RuleSet::standard();
/// let cleaner = TextCleaner::new(&rules);
/// assert_eq!(cleaner.clean("Berlin (dpa) – Text. Artikel weiterlesen"), "Berlin (dpa) – Text.");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TextCleaner<'r> {
    rules: &'r RuleSet,
}

impl<'r> TextCleaner<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Clean `text`.
    ///
    /// The result is trimmed, contains no run of three or more newlines and
    /// is a fixed point: cleaning it again returns it unchanged.
    pub fn clean(&self, text: &str) -> String {
        let mut current = self.pass(text);
        loop {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// One trim, strip, collapse, trim round.
    fn pass(&self, text: &str) -> String {
        let mut out = text.trim().to_string();

        for rule in self.rules.strip_rules() {
            if let Cow::Owned(replaced) = rule.apply(&out) {
                out = replaced;
            }
        }

        collapse_blank_lines(&out).trim().to_string()
    }
}

/// Collapse every run of three or more newlines into exactly two.
pub fn collapse_blank_lines(text: &str) -> Cow<'_, str> {
    BLANK_LINES_RE.replace_all(text, "\n\n")
}
