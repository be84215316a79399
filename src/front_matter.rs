//! YAML front matter extraction.
//!
//! A document may open with a metadata block fenced by `---`:
//!
//! ```
//! let fm = mdpage::front_matter::extract("---\ntitle: Guide\nversion: 2.1\n---\n# Intro\n");
//! assert_eq!(fm.metadata.title, "Guide");
//! assert_eq!(fm.metadata.version, "2.1");
//! assert_eq!(fm.body, "# Intro");
//! ```
//!
//! The fence is matched as a plain substring, not as a line: the text is
//! split on `---` at most twice, and only a split that yields all three parts
//! (leading empty part, YAML block, body) counts as front matter. Anything
//! else is treated as a body-only document with default metadata.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{Diagnostic, DiagnosticKind, Result};

/// Front matter delimiter.
pub const FENCE: &str = "---";

/// Document metadata.
///
/// Built once from [`Metadata::default`] merged with whatever the front
/// matter provides, and never mutated afterwards. Only `title`, `author`
/// and `version` reach the page; other keys are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub version: String,
    pub extra: BTreeMap<String, String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            author: String::new(),
            version: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// Keys recognised in the front matter. Everything else lands in `extra`.
#[derive(Debug, Default, Deserialize)]
struct RawFrontMatter {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    author: Option<Value>,
    #[serde(default)]
    version: Option<Value>,
    #[serde(flatten)]
    extra: Mapping,
}

impl Metadata {
    /// Parse a YAML block and merge it onto the defaults.
    ///
    /// An empty block (or an empty mapping) yields the defaults. A block that
    /// is not valid YAML or not a mapping is an error.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_yaml::from_str(yaml)?;
        let is_empty = match &value {
            Value::Null => true,
            Value::Mapping(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            return Ok(Self::default());
        }
        let raw: RawFrontMatter = serde_yaml::from_value(value)?;
        Ok(Self::default().merge(raw))
    }

    fn merge(self, raw: RawFrontMatter) -> Self {
        let mut extra = self.extra;
        extra.extend(raw.extra.into_iter().filter_map(|(key, value)| {
            Some((scalar_to_string(key)?, scalar_to_string(value)?))
        }));

        Self {
            title: raw.title.and_then(scalar_to_string).unwrap_or(self.title),
            author: raw.author.and_then(scalar_to_string).unwrap_or(self.author),
            version: raw.version.and_then(scalar_to_string).unwrap_or(self.version),
            extra,
        }
    }

    /// Flat view of every key, the three known ones included.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = self.extra.clone();
        map.insert("title".to_string(), self.title.clone());
        map.insert("author".to_string(), self.author.clone());
        map.insert("version".to_string(), self.version.clone());
        map
    }

    /// Whether the header info block (author / version) has anything to show.
    pub fn has_product_info(&self) -> bool {
        !self.author.is_empty() || !self.version.is_empty()
    }
}

/// String form of a YAML value. `null` means "not provided".
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_to_string(tagged.value),
        other => serde_yaml::to_string(&other)
            .ok()
            .map(|s| s.trim().to_string()),
    }
}

/// Result of [`extract`].
#[derive(Debug, Clone)]
pub struct FrontMatter<'a> {
    pub metadata: Metadata,
    /// Markdown body with the front matter stripped.
    pub body: &'a str,
    /// Set when a front matter block was present but unusable.
    pub diagnostic: Option<Diagnostic>,
}

/// Split `text` into its YAML block (trimmed) and body.
///
/// Returns `(None, text)` unless the text starts with the fence and the
/// split yields three parts; in that case the body is trimmed too.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    if !text.starts_with(FENCE) {
        return (None, text);
    }
    let mut parts = text.splitn(3, FENCE);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(yaml), Some(body)) => (Some(yaml.trim()), body.trim()),
        _ => (None, text),
    }
}

/// Extract metadata and body from a document.
///
/// Never fails: an unparseable block falls back to default metadata and is
/// reported through the returned diagnostic (and a warning log).
pub fn extract(text: &str) -> FrontMatter<'_> {
    let (yaml, body) = split_front_matter(text);
    let Some(yaml) = yaml else {
        return FrontMatter {
            metadata: Metadata::default(),
            body,
            diagnostic: None,
        };
    };

    match Metadata::from_yaml(yaml) {
        Ok(metadata) => {
            debug!(title = %metadata.title, extra_keys = metadata.extra.len(), "front matter parsed");
            FrontMatter {
                metadata,
                body,
                diagnostic: None,
            }
        }
        Err(err) => {
            let diagnostic = Diagnostic::new(
                DiagnosticKind::FrontMatter,
                format!("failed to parse front matter, using defaults: {err}"),
            )
            .warn();
            FrontMatter {
                metadata: Metadata::default(),
                body,
                diagnostic: Some(diagnostic),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_fence_means_default_metadata_and_whole_body() {
        let text = "# Title\n\nSome text.\n";
        let fm = extract(text);
        assert_eq!(fm.metadata, Metadata::default());
        assert_eq!(fm.body, text);
        assert!(fm.diagnostic.is_none());
    }

    #[test]
    fn default_map_is_exact() {
        let map = extract("plain body").metadata.to_map();
        let expected: BTreeMap<String, String> = [
            ("author", ""),
            ("title", "Untitled"),
            ("version", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(map, expected);
    }

    #[test]
    fn known_keys_are_read() {
        let fm = extract("---\ntitle: X\nauthor: Y\nversion: Z\n---\n\nBody\n");
        assert_eq!(fm.metadata.title, "X");
        assert_eq!(fm.metadata.author, "Y");
        assert_eq!(fm.metadata.version, "Z");
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let fm = extract("---\nauthor: Team\n---\nBody");
        assert_eq!(fm.metadata.title, "Untitled");
        assert_eq!(fm.metadata.author, "Team");
        assert_eq!(fm.metadata.version, "");
    }

    #[test]
    fn numeric_and_null_values() {
        let fm = extract("---\ntitle: ~\nversion: 1.5\n---\nBody");
        assert_eq!(fm.metadata.title, "Untitled");
        assert_eq!(fm.metadata.version, "1.5");
    }

    #[test]
    fn extra_keys_are_kept_but_separate() {
        let fm = extract("---\ntitle: Doc\nlang: ru\ndraft: true\n---\nBody");
        assert_eq!(fm.metadata.extra.get("lang").map(String::as_str), Some("ru"));
        assert_eq!(fm.metadata.extra.get("draft").map(String::as_str), Some("true"));
        assert_eq!(fm.metadata.to_map().len(), 5);
    }

    #[test]
    fn invalid_yaml_falls_back_with_diagnostic() {
        let fm = extract("---\ntitle: [unclosed\n---\nBody");
        assert_eq!(fm.metadata, Metadata::default());
        assert_eq!(fm.body, "Body");
        let diag = fm.diagnostic.expect("diagnostic");
        assert_eq!(diag.kind, DiagnosticKind::FrontMatter);
    }

    #[test]
    fn non_mapping_yaml_falls_back_with_diagnostic() {
        let fm = extract("---\njust a sentence\n---\nBody");
        assert_eq!(fm.metadata, Metadata::default());
        assert!(fm.diagnostic.is_some());
    }

    #[test]
    fn empty_block_is_silent() {
        let fm = extract("------\nBody");
        assert_eq!(fm.metadata, Metadata::default());
        assert_eq!(fm.body, "Body");
        assert!(fm.diagnostic.is_none());
    }

    #[test]
    fn single_fence_keeps_whole_text_as_body() {
        let text = "---\ntitle: X\nno closing fence here";
        let fm = extract(text);
        assert_eq!(fm.metadata, Metadata::default());
        assert_eq!(fm.body, text);
        assert!(fm.diagnostic.is_none());
    }

    #[test]
    fn split_uses_first_two_fences_only() {
        let (yaml, body) = split_front_matter("---\na: 1\n---\nbefore\n\n---\n\nafter");
        assert_eq!(yaml, Some("a: 1"));
        assert_eq!(body, "before\n\n---\n\nafter");
    }

    #[test]
    fn fence_is_matched_as_substring() {
        let (yaml, body) = split_front_matter("---title: T---rest");
        assert_eq!(yaml, Some("title: T"));
        assert_eq!(body, "rest");
    }

    #[test]
    fn product_info_presence() {
        assert!(!Metadata::default().has_product_info());
        let meta = Metadata {
            version: "3".into(),
            ..Metadata::default()
        };
        assert!(meta.has_product_info());
    }
}
