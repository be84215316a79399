//! Heading slugs and the nested table of contents.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::template::escape_html;

/// Characters dropped from slugs: anything but word characters, whitespace,
/// hyphens and en/em dashes.
static SLUG_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-–—]").expect("valid slug strip pattern"));

/// Runs of separators that collapse into a single hyphen.
static SLUG_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-–—]+").expect("valid slug separator pattern"));

/// Trailing `_N` counter added by [`unique_slug`].
static COUNTER_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)_([0-9]+)$").expect("valid counter pattern"));

/// Turn heading text into an anchor id.
///
/// ```
/// assert_eq!(mdpage::toc::slugify("Step 1 — Setup"), "step-1-setup");
/// assert_eq!(mdpage::toc::slugify("What's new?"), "whats-new");
/// ```
pub fn slugify(text: &str) -> String {
    let stripped = SLUG_STRIP_RE.replace_all(text, "");
    let lowered = stripped.to_lowercase();
    SLUG_SEPARATOR_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Make `slug` unique among `used` and record it.
///
/// Duplicates get a `_1`, `_2`, ... counter; an empty slug becomes `_1`.
pub fn unique_slug(slug: &str, used: &mut HashSet<String>) -> String {
    let mut id = slug.to_string();
    while id.is_empty() || used.contains(&id) {
        id = match COUNTER_SUFFIX_RE.captures(&id) {
            Some(caps) => {
                let n = caps[2].parse::<u64>().unwrap_or(0);
                format!("{}_{}", &caps[1], n + 1)
            }
            None => format!("{id}_1"),
        };
    }
    used.insert(id.clone());
    id
}

/// One heading in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub title: String,
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    pub fn new(level: u8, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            title: title.into(),
            children: Vec::new(),
        }
    }
}

/// Nest a flat, document-ordered heading list.
///
/// Each entry becomes a child of the nearest preceding entry with a smaller
/// level, or a top-level entry when there is none.
pub fn nest(flat: Vec<TocEntry>) -> Vec<TocEntry> {
    let mut roots = Vec::new();
    let mut open: Vec<TocEntry> = Vec::new();

    for entry in flat {
        while open.last().is_some_and(|top| top.level >= entry.level) {
            close_last(&mut open, &mut roots);
        }
        open.push(entry);
    }
    while !open.is_empty() {
        close_last(&mut open, &mut roots);
    }
    roots
}

fn close_last(open: &mut Vec<TocEntry>, roots: &mut Vec<TocEntry>) {
    let Some(done) = open.pop() else { return };
    match open.last_mut() {
        Some(parent) => parent.children.push(done),
        None => roots.push(done),
    }
}

/// Render the TOC container: `<div class="{class}">` around nested lists.
pub fn render_toc(entries: &[TocEntry], class: &str) -> String {
    let mut out = format!("<div class=\"{}\">\n", escape_html(class));
    render_list(entries, &mut out);
    out.push_str("</div>\n");
    out
}

fn render_list(entries: &[TocEntry], out: &mut String) {
    out.push_str("<ul>\n");
    for entry in entries {
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            escape_html(&entry.id),
            escape_html(&entry.title)
        ));
        if !entry.children.is_empty() {
            out.push('\n');
            render_list(&entry.children, out);
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slug_dash_variants_collapse() {
        assert_eq!(slugify("Step 1 — Setup"), "step-1-setup");
        assert_eq!(slugify("Step 1 – Setup"), "step-1-setup");
        assert_eq!(slugify("Step 1 - Setup"), "step-1-setup");
    }

    #[test]
    fn slug_strips_punctuation_without_stray_hyphens() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  (Optional) step  "), "optional-step");
        assert_eq!(slugify("a/b"), "ab");
    }

    #[test]
    fn slug_keeps_unicode_word_characters() {
        assert_eq!(slugify("Установка и настройка"), "установка-и-настройка");
        assert_eq!(slugify("snake_case name"), "snake_case-name");
    }

    #[test]
    fn unique_slug_counts_duplicates() {
        let mut used = HashSet::new();
        assert_eq!(unique_slug("intro", &mut used), "intro");
        assert_eq!(unique_slug("intro", &mut used), "intro_1");
        assert_eq!(unique_slug("intro", &mut used), "intro_2");
    }

    #[test]
    fn unique_slug_handles_empty_and_existing_counter() {
        let mut used = HashSet::new();
        assert_eq!(unique_slug("", &mut used), "_1");
        assert_eq!(unique_slug("", &mut used), "_2");
        assert_eq!(unique_slug("v_2", &mut used), "v_2");
        assert_eq!(unique_slug("v_2", &mut used), "v_3");
    }

    #[test]
    fn nest_builds_hierarchy() {
        let flat = vec![
            TocEntry::new(2, "a", "A"),
            TocEntry::new(3, "a1", "A1"),
            TocEntry::new(4, "a1x", "A1x"),
            TocEntry::new(3, "a2", "A2"),
            TocEntry::new(2, "b", "B"),
        ];
        let tree = nest(flat);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].children[0].id, "a1x");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn nest_starting_deep_then_shallow() {
        let tree = nest(vec![TocEntry::new(3, "deep", "Deep"), TocEntry::new(2, "top", "Top")]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, "deep");
        assert_eq!(tree[1].id, "top");
    }

    #[test]
    fn render_escapes_titles() {
        let html = render_toc(&[TocEntry::new(2, "a-b", "A & <B>")], "sidebar-toc");
        assert!(html.starts_with("<div class=\"sidebar-toc\">"));
        assert!(html.contains("<a href=\"#a-b\">A &amp; &lt;B&gt;</a>"));
    }

    #[test]
    fn render_empty_toc_keeps_container() {
        assert_eq!(render_toc(&[], "toc"), "<div class=\"toc\">\n<ul>\n</ul>\n</div>\n");
    }
}
