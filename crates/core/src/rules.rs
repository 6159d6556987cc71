//! Sanitizer rule set.
//!
//! A [`RuleSet`] holds two ordered lists: structural selectors that the DOM
//! pruner removes before extraction, and text strip rules that the cleaner
//! applies to the extracted plain text. The set is built once and shared by
//! reference; nothing mutates it after construction.

use std::borrow::Cow;

use regex::{Captures, Regex};

use crate::{NewsdeskError, Result};

/// Selectors for page chrome of the supported news sites.
///
/// Substring matches on `class` are case-sensitive, hence the paired
/// spellings.
pub const STANDARD_SELECTORS: &[&str] = &[
    r#"[class*="TTS"]"#,
    r#"[class*="tts"]"#,
    r#"[class*="audio-player"]"#,
    r#"[class*="paywall"]"#,
    r#"[class*="Paywall"]"#,
    r#"[class*="newsletter"]"#,
    r#"[class*="Newsletter"]"#,
    r#"[class*="social-bar"]"#,
    r#"[class*="share"]"#,
    r#"[class*="related"]"#,
    r#"[class*="teaser"]"#,
    r#"[class*="ad-"]"#,
    r#"[class*="Ad-"]"#,
    r#"[class*="cookie"]"#,
    r#"[class*="consent"]"#,
    r#"[class*="navigation"]"#,
    r#"[class*="breadcrumb"]"#,
    r#"[data-component="TTS"]"#,
    "aside",
    "nav",
    "footer",
];

/// Lines that are dropped when they stand alone.
const STANDALONE_LINES: &[&str] = &[
    "Teilen",
    "Kommentare",
    "Empfehlungen",
    "Auch interessant",
    "Lesen Sie auch",
    "BILD Deals",
    "Newsletter",
];

/// Ordered `(name, pattern)` pairs for the standard strip rules.
///
/// The standalone-line rules and the paywall-brand rule are appended in
/// [`RuleSet::standard`] at their position in this order.
const STRIP_PATTERNS_HEAD: &[(&str, &str)] = &[
    ("tts-skip", r"(?i)TTS-Player\s*[uü]berspringen\s*"),
    ("continue-article", r"(?i)Artikel\s*weiterlesen\s*"),
    ("read-article", r"(?i)Artikel\s*lesen\s*"),
    ("paywall-continue", r"(?i)Weiterlesen\s*mit\s*BILDplus\s*"),
    ("paywall-read-now", r"(?i)Jetzt\s*mit\s*BILDplus\s*lesen\s*"),
];

const STRIP_PATTERNS_TAIL: &[(&str, &str)] = &[
    ("photo-credit", r"Foto:\s*[^\n]{0,60}(?:\n|$)"),
    ("source-attribution", r"(?i)Quelle:\s*BILD\s*"),
    ("more-video", r"(?i)Mehr\s*zum\s*Video\s*anzeigen\s*"),
    (
        "video-consent",
        r"(?is)Wir\s*haben\s*personalisierte\s*Videos\s*f[uü]r\s*dich!.*?(?:Zustimmung\.|$)",
    ),
    (
        "third-party-consent",
        r"(?is)Um\s*mit\s*Inhalten\s*von\s*Drittanbietern\s*zu\s*interagieren.*?(?:Zustimmung\.|$)",
    ),
    ("consent-needed", r"(?i)brauchen\s*wir\s*deine\s*Zustimmung\.\s*"),
    ("activate-external", r"(?i)Aktiviere\s*externe\s*Inhalte.*?(?:\.\s|$)"),
    ("external-content", r"(?i)Externer\s*Inhalt\s*"),
    ("agree", r"(?i)Ich\s*bin\s*damit\s*einverstanden.*?(?:\.\s|$)"),
    ("privacy-policy", r"(?i)Datenschutzerkl[aä]rung\s*"),
    ("more-information", r"(?i)Mehr\s*Informationen\s*dazu\s*findest\s*du\s*in\s*unserer\s*"),
    ("embedded-content", r"(?is)Um\s*eingebettete\s*Inhalte\s*anzuzeigen.*?(?:DSGVO\)\.?\s*Mit|$)"),
    (
        "switch-click",
        r"(?is)Mit\s*dem\s*Klick\s*auf\s*den\s*Schalter.*?(?:Tracking\s*und\s*Cookies|einverstanden)",
    ),
    ("revoke-tracking", r"(?i)Widerruf\s*Tracking\s*und\s*Cookies\s*"),
    ("third-country-transfer", r"(?i)Dabei\s*k[oö]nnen\s*Daten\s*in\s*Drittl[aä]nder.*?(?:\.\s|$)"),
];

const TIMESTAMP_PATTERN: &str = r"[0-9]{2}\.[0-9]{2}\.[0-9]{4}\s*-\s*[0-9]{2}:[0-9]{2}\s*Uhr\s*";

/// Bare brand mention. The rule keeps a match whose `brand` is directly
/// followed by a hyphen or word character, so compounds like `BILDplus-Abo`
/// survive.
const PAYWALL_BRAND_PATTERN: &str = r"(?P<brand>BILDplus)\s*";

fn is_compound_continuation(c: char) -> bool {
    c == '-' || c == '_' || c.is_ascii_alphanumeric()
}

/// A structural removal rule applied to the HTML before extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizerRule {
    selector: String,
}

impl SanitizerRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self { selector: selector.into() }
    }

    /// The CSS selector identifying elements to delete.
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

/// A text rewrite applied globally to extracted plain text.
///
/// Every match is replaced with the empty string, except when a guard keeps
/// it: the character right after the guarded capture group satisfies the
/// guard's predicate. The check looks at the text without consuming it.
#[derive(Debug, Clone)]
pub struct TextStripRule {
    name: String,
    pattern: Regex,
    guard: Option<Guard>,
}

#[derive(Debug, Clone, Copy)]
struct Guard {
    group: &'static str,
    followed_by: fn(char) -> bool,
}

impl TextStripRule {
    /// Compiles a strip rule.
    ///
    /// # Errors
    ///
    /// Returns [`NewsdeskError::InvalidRule`] if `pattern` is not a valid regex.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|e| NewsdeskError::InvalidRule { name: name.clone(), reason: e.to_string() })?;
        Ok(Self { name, pattern, guard: None })
    }

    /// Leaves a match in place when the text right after capture `group`
    /// starts with a character for which `followed_by` holds.
    pub fn unless_followed_by(mut self, group: &'static str, followed_by: fn(char) -> bool) -> Self {
        self.guard = Some(Guard { group, followed_by });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Applies the rule to every occurrence in `text`.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.guard {
            None => self.pattern.replace_all(text, ""),
            Some(guard) => self.pattern.replace_all(text, |caps: &Captures<'_>| {
                let kept = caps
                    .name(guard.group)
                    .and_then(|m| text[m.end()..].chars().next())
                    .is_some_and(guard.followed_by);
                if kept { caps[0].to_string() } else { String::new() }
            }),
        }
    }
}

/// Immutable, ordered configuration for the pruner and the cleaner.
#[derive(Debug, Clone)]
pub struct RuleSet {
    selectors: Vec<SanitizerRule>,
    strip_rules: Vec<TextStripRule>,
}

impl RuleSet {
    pub fn new(selectors: Vec<SanitizerRule>, strip_rules: Vec<TextStripRule>) -> Self {
        Self { selectors, strip_rules }
    }

    /// The rule set for the supported news sites.
    pub fn standard() -> Self {
        let selectors = STANDARD_SELECTORS.iter().map(|s| SanitizerRule::new(*s)).collect();

        let mut strip_rules: Vec<TextStripRule> = STRIP_PATTERNS_HEAD.iter().map(|(n, p)| standard_rule(n, p)).collect();

        strip_rules.push(
            standard_rule("paywall-brand", PAYWALL_BRAND_PATTERN).unless_followed_by("brand", is_compound_continuation),
        );
        strip_rules.extend(STRIP_PATTERNS_TAIL.iter().map(|(n, p)| standard_rule(n, p)));

        for line in STANDALONE_LINES {
            let words: Vec<String> = line.split_whitespace().map(regex::escape).collect();
            let pattern = format!(r"(?m)^\s*{}\s*$", words.join(r"\s*"));
            strip_rules.push(standard_rule(&format!("standalone:{line}"), &pattern));
        }

        strip_rules.push(standard_rule("timestamp", TIMESTAMP_PATTERN));

        Self { selectors, strip_rules }
    }

    /// Returns a copy with `rule` appended to the structural list.
    pub fn with_selector(mut self, rule: SanitizerRule) -> Self {
        self.selectors.push(rule);
        self
    }

    /// Returns a copy with `rule` appended to the strip list.
    pub fn with_strip_rule(mut self, rule: TextStripRule) -> Self {
        self.strip_rules.push(rule);
        self
    }

    pub fn selectors(&self) -> &[SanitizerRule] {
        &self.selectors
    }

    pub fn strip_rules(&self) -> &[TextStripRule] {
        &self.strip_rules
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_rule(name: &str, pattern: &str) -> TextStripRule {
    TextStripRule::new(name, pattern).expect("standard strip rule should compile")
}
