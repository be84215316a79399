//! Markdown to HTML fragment renderer.
//!
//! Markdown is rendered through `pulldown-cmark` with tables and definition
//! lists enabled (fenced code is part of CommonMark). Before rendering, the
//! event stream gets two rewrites:
//!
//! - every heading receives a unique slug `id` (see [`crate::toc::slugify`]);
//! - a paragraph consisting of nothing but `[TOC]` is replaced by the TOC
//!   container built from the headings in the configured level range.
//!
//! The marker is matched case-insensitively: `[toc]` is normalised to
//! `[TOC]` first. Without a marker no TOC container is emitted.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use tracing::debug;

use crate::config::TocOptions;
use crate::toc::{self, TocEntry};

/// Canonical table-of-contents marker.
pub const TOC_MARKER: &str = "[TOC]";

static TOC_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[toc\]").expect("valid TOC marker pattern"));

/// Replace every case-insensitive `[toc]` with [`TOC_MARKER`].
pub fn normalize_toc_markers(markdown: &str) -> Cow<'_, str> {
    TOC_MARKER_RE.replace_all(markdown, TOC_MARKER)
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_DEFINITION_LIST);
    options
}

/// Render a Markdown body to an HTML fragment.
pub fn render_markdown(markdown: &str, toc_options: &TocOptions) -> String {
    let markdown = normalize_toc_markers(markdown);
    let mut events: Vec<Event<'_>> = Parser::new_ext(&markdown, markdown_options()).collect();

    let headings = assign_heading_ids(&mut events, toc_options);
    debug!(toc_entries = headings.len(), "headings collected");
    let toc_html = toc::render_toc(&toc::nest(headings), &toc_options.class);
    let events = replace_toc_markers(events, &toc_html);

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, events.into_iter());
    html_output
}

/// Give every heading an id and return the flat TOC entries.
///
/// Ids already present on a heading are kept and reserved, so generated
/// slugs never collide with them.
fn assign_heading_ids(events: &mut [Event<'_>], toc_options: &TocOptions) -> Vec<TocEntry> {
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();
    let mut entries = Vec::new();

    for i in 0..events.len() {
        let (level, existing) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => {
                (*level as u8, id.as_ref().map(|id| id.to_string()))
            }
            _ => continue,
        };
        let text = heading_text(&events[i + 1..]);

        let id = match existing {
            Some(id) => id,
            None => {
                let id = toc::unique_slug(&toc::slugify(&text), &mut used);
                if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
                    *slot = Some(CowStr::from(id.clone()));
                }
                id
            }
        };

        if toc_options.includes(level) {
            entries.push(TocEntry::new(level, id, text.trim()));
        }
    }
    entries
}

/// Plain text of a heading, read up to its end tag. Inline HTML tags are
/// dropped, the text between them is kept.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Swap `[TOC]`-only paragraphs for the rendered TOC container.
fn replace_toc_markers<'a>(events: Vec<Event<'a>>, toc_html: &str) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut paragraph: Option<Vec<Event<'a>>> = None;

    for event in events {
        if let Some(buf) = paragraph.as_mut() {
            let closes = matches!(event, Event::End(TagEnd::Paragraph));
            buf.push(event);
            if closes {
                let buf = paragraph.take().unwrap_or_default();
                if is_toc_marker(&buf) {
                    out.push(Event::Html(CowStr::from(toc_html.to_string())));
                } else {
                    out.extend(buf);
                }
            }
            continue;
        }
        if matches!(event, Event::Start(Tag::Paragraph)) {
            paragraph = Some(vec![event]);
        } else {
            out.push(event);
        }
    }
    if let Some(buf) = paragraph {
        out.extend(buf);
    }
    out
}

/// A paragraph (start and end tags included) whose only content is the marker text.
fn is_toc_marker(paragraph: &[Event<'_>]) -> bool {
    let inner = match paragraph {
        [_, inner @ .., _] => inner,
        _ => return false,
    };
    let mut text = String::new();
    for event in inner {
        match event {
            Event::Text(t) => text.push_str(t),
            _ => return false,
        }
    }
    text.trim() == TOC_MARKER
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(md: &str) -> String {
        render_markdown(md, &TocOptions::default())
    }

    #[test]
    fn normalizes_marker_case() {
        assert_eq!(normalize_toc_markers("[toc] and [Toc]"), "[TOC] and [TOC]");
    }

    #[test]
    fn headings_get_slug_ids() {
        let html = render("# Title\n\n## Step 1 — Setup\n");
        assert!(html.contains("<h1 id=\"title\">Title</h1>"), "{html}");
        assert!(html.contains("<h2 id=\"step-1-setup\">Step 1 — Setup</h2>"), "{html}");
    }

    #[test]
    fn duplicate_headings_get_distinct_ids() {
        let html = render("## Intro\n\n## Intro\n");
        assert!(html.contains("id=\"intro\""));
        assert!(html.contains("id=\"intro_1\""));
    }

    #[test]
    fn marker_paragraph_becomes_toc_container() {
        let html = render("[TOC]\n\n# Doc\n\n## One\n\n### One A\n\n## Two\n");
        assert!(!html.contains("[TOC]"), "{html}");
        assert!(html.contains("<div class=\"sidebar-toc\">"), "{html}");
        assert!(html.contains("<a href=\"#one\">One</a>"));
        assert!(html.contains("<a href=\"#one-a\">One A</a>"));
        assert!(!html.contains("<a href=\"#doc\">"), "h1 is outside the TOC range");
    }

    #[test]
    fn lowercase_marker_matches_uppercase() {
        let body = "\n\n## Alpha\n\n## Beta\n";
        assert_eq!(render(&format!("[toc]{body}")), render(&format!("[TOC]{body}")));
    }

    #[test]
    fn no_marker_no_container() {
        let html = render("## Alpha\n\nText\n");
        assert!(!html.contains("sidebar-toc"));
    }

    #[test]
    fn inline_marker_is_left_as_text() {
        let html = render("See [TOC] for details.\n\n## Alpha\n");
        assert!(html.contains("See [TOC] for details."), "{html}");
        assert!(!html.contains("sidebar-toc"));
    }

    #[test]
    fn tables_and_definition_lists() {
        let html = render("| A | B |\n|---|---|\n| 1 | 2 |\n\nTerm\n: Definition\n");
        assert!(html.contains("<table>"), "{html}");
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<dl>"), "{html}");
        assert!(html.contains("<dt>Term</dt>"));
        assert!(html.contains("<dd>"), "{html}");
        assert!(html.contains("Definition"));
    }

    #[test]
    fn fenced_code_keeps_language_class() {
        let html = render("```rust\nfn main() {}\n```\n");
        assert!(html.contains("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"));
    }

    #[test]
    fn heading_text_includes_inline_code() {
        let html = render("[TOC]\n\n## Using `cargo`\n");
        assert!(html.contains("id=\"using-cargo\""), "{html}");
        assert!(html.contains("<a href=\"#using-cargo\">Using cargo</a>"), "{html}");
    }

    #[test]
    fn heading_text_strips_inline_html_tags() {
        let html = render("[TOC]\n\n## Hello <em>world</em>\n\n## A &amp; <B>\n");
        assert!(html.contains("<a href=\"#hello-world\">Hello world</a>"), "{html}");
        assert!(html.contains("<a href=\"#a\">A &amp;</a>"), "{html}");
    }
}
