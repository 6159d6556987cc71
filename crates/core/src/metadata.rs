use serde_json::Value;

use crate::parse::{Document, Element};

/// Longest excerpt taken from body text, in characters.
const MAX_EXCERPT_CHARS: usize = 300;

/// Paragraphs at or below this many characters are not used as an excerpt.
const MIN_EXCERPT_PARAGRAPH_CHARS: usize = 50;

/// Separators news sites put between the headline and their own name.
const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " – ", " — ", " :: "];

impl Document {
    /// Extract title with priority fallback:
    /// 1. JSON-LD `headline`
    /// 2. Open Graph `og:title`
    /// 3. Twitter `twitter:title`
    /// 4. `<title>` element, with a trailing site name trimmed
    /// 5. First `<h1>` element
    pub fn extract_title(&self) -> Option<String> {
        if let Some(headline) = self.json_ld_string("headline") {
            return Some(headline);
        }

        if let Some(title) = self.get_meta_content("og:title") {
            return Some(title);
        }

        if let Some(title) = self.get_meta_content("twitter:title") {
            return Some(title);
        }

        if let Some(title) = self.title() {
            let title = trim_site_suffix(title.trim());
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }

        if let Ok(elements) = self.select("h1")
            && let Some(first) = elements.first()
        {
            let text = first.text();
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }

        None
    }

    /// Extract excerpt from document metadata:
    /// 1. Open Graph `og:description`
    /// 2. Meta `description`
    /// 3. JSON-LD `description`
    ///
    /// See [`excerpt_from_content`] for the body-text fallback.
    pub fn extract_excerpt(&self) -> Option<String> {
        if let Some(desc) = self.get_meta_content("og:description") {
            return Some(desc);
        }

        if let Some(desc) = self.get_meta_content("description") {
            return Some(desc);
        }

        self.json_ld_string("description")
    }

    /// Get meta tag content by name or property attribute
    pub fn get_meta_content(&self, attr: &str) -> Option<String> {
        for key in ["name", "property"] {
            let selector = format!("meta[{}=\"{}\"]", key, attr);
            if let Ok(elements) = self.select(&selector)
                && let Some(el) = elements.first()
                && let Some(content) = el.attr("content")
            {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }

        None
    }

    /// First string value for `key` across all JSON-LD objects on the page.
    fn json_ld_string(&self, key: &str) -> Option<String> {
        self.extract_json_ld().iter().find_map(|obj| {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    }

    /// Extract and parse JSON-LD from script tags, flattening top-level
    /// arrays and `@graph` lists into a flat list of objects.
    fn extract_json_ld(&self) -> Vec<Value> {
        let mut objects = Vec::new();
        let Ok(elements) = self.select("script[type=\"application/ld+json\"]") else {
            return objects;
        };

        for el in elements.iter() {
            if let Ok(value) = serde_json::from_str::<Value>(el.text().trim()) {
                flatten_json_ld(value, &mut objects);
            }
        }
        objects
    }
}

/// First paragraph inside `content` long enough to serve as an excerpt,
/// truncated to 300 characters.
pub fn excerpt_from_content(content: &Element<'_>) -> Option<String> {
    let paragraphs = content.select("p").ok()?;

    paragraphs.iter().find_map(|el| {
        let text = el.text();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.chars().count() <= MIN_EXCERPT_PARAGRAPH_CHARS {
            return None;
        }

        if text.chars().count() > MAX_EXCERPT_CHARS {
            let truncated: String = text.chars().take(MAX_EXCERPT_CHARS).collect();
            Some(format!("{}...", truncated.trim_end()))
        } else {
            Some(text)
        }
    })
}

fn flatten_json_ld(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => items.into_iter().for_each(|item| flatten_json_ld(item, out)),
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_json_ld(graph, out);
            }
            out.push(Value::Object(map));
        }
        _ => {}
    }
}

/// Drop a trailing "| Site Name" style suffix when at least three words of
/// headline remain.
fn trim_site_suffix(title: &str) -> &str {
    let cut = TITLE_SEPARATORS.iter().filter_map(|sep| title.rfind(sep)).max();

    match cut {
        Some(idx) if title[..idx].split_whitespace().count() >= 3 => title[..idx].trim_end(),
        _ => title,
    }
}
