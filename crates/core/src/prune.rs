//! Structural pruning of page chrome.
//!
//! The page is parsed and serialized once, so the rewriter sees every element
//! closed where a browser would close it. Every [`SanitizerRule`] then runs as
//! its own streaming rewrite, so a selector the rewriter rejects only costs
//! that one rule.

use lol_html::{HtmlRewriter, Selector, Settings, element};

use crate::error::RuleApplicationError;
use crate::parse::normalize;
use crate::rules::SanitizerRule;

/// Outcome of a pruning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneReport {
    /// The pruned markup. Identical to the input when nothing matched.
    pub html: String,
    /// Number of elements removed across all rules.
    pub removed: usize,
    /// Rules that could not be applied.
    pub skipped: Vec<RuleApplicationError>,
}

/// Remove every element matched by any of `rules`, in rule order.
///
/// Never fails. Rules with an unsupported selector are reported in
/// [`PruneReport::skipped`] and the rest still run.
///
/// # Example
///
/// ```rust
/// use newsdesk_core::{SanitizerRule, prune_html};
///
/// let rules = vec![SanitizerRule::new("nav")];
/// let report = prune_html("<body><nav>Menü</nav><p>Text</p></body>", &rules);
/// assert!(!report.html.contains("Menü"));
/// assert_eq!(report.removed, 1);
/// ```
pub fn prune_html(html: &str, rules: &[SanitizerRule]) -> PruneReport {
    if rules.is_empty() {
        return PruneReport { html: html.to_string(), removed: 0, skipped: Vec::new() };
    }

    let mut current = normalize(html);
    let mut removed = 0;
    let mut skipped = Vec::new();

    for rule in rules {
        match apply_rule(&current, rule) {
            Ok((_, 0)) => {}
            Ok((output, count)) => {
                current = output;
                removed += count;
            }
            Err(err) => {
                tracing::debug!(selector = rule.selector(), reason = %err.reason, "skipping sanitizer rule");
                skipped.push(err);
            }
        }
    }

    if removed == 0 {
        current = html.to_string();
    }

    PruneReport { html: current, removed, skipped }
}

/// Run a single removal pass, returning the rewritten markup and the number
/// of elements removed.
fn apply_rule(html: &str, rule: &SanitizerRule) -> Result<(String, usize), RuleApplicationError> {
    let skipped = |reason: String| RuleApplicationError { selector: rule.selector().to_string(), reason };

    rule.selector().parse::<Selector>().map_err(|e| skipped(e.to_string()))?;

    let mut output = Vec::with_capacity(html.len());
    let mut count = 0usize;

    {
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!(rule.selector(), |el| {
                    el.remove();
                    count += 1;
                    Ok(())
                })],
                ..Default::default()
            },
            |c: &[u8]| output.extend_from_slice(c),
        );

        rewriter.write(html.as_bytes()).map_err(|e| skipped(e.to_string()))?;
        rewriter.end().map_err(|e| skipped(e.to_string()))?;
    }

    Ok((String::from_utf8_lossy(&output).into_owned(), count))
}
