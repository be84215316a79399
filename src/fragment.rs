//! Post-processing of the rendered body fragment.
//!
//! The rendered Markdown is parsed once with `scraper` (html5ever). From the
//! parsed tree we capture and detach the TOC container, list the image
//! sources that need embedding, and serialise the remaining body in an
//! indented one-tag-per-line form for the content pane.

use std::collections::HashMap;
use std::sync::LazyLock;

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

use crate::template::escape_html;

static DIV_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div").expect("valid div selector"));

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src]").expect("valid img selector"));

/// Elements without an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is written exactly as parsed.
const PRESERVE_WHITESPACE: &[&str] = &["pre", "textarea"];

/// Elements whose text content is not escaped.
const RAW_TEXT: &[&str] = &["script", "style"];

/// A parsed body fragment.
pub struct Fragment {
    html: Html,
}

impl Fragment {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_fragment(html),
        }
    }

    /// Capture the first `<div>` with the given class and remove it from the body.
    ///
    /// Returns the container's outer HTML, or `None` when the body has none.
    pub fn take_toc(&mut self, class: &str) -> Option<String> {
        let (id, outer) = self
            .html
            .select(&DIV_SELECTOR)
            .find(|el| el.value().classes().any(|c| c == class))
            .map(|el| (el.id(), el.html()))?;

        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
        Some(outer)
    }

    /// `src` of every `<img>` in document order.
    pub fn image_sources(&self) -> Vec<String> {
        self.html
            .select(&IMG_SELECTOR)
            .filter_map(|el| el.value().attr("src"))
            .map(str::to_string)
            .collect()
    }

    /// Indented serialisation of the body.
    ///
    /// `<img src>` values found in `rewrites` are replaced on the way out.
    pub fn prettify(&self, rewrites: &HashMap<String, String>) -> String {
        let mut out = String::new();
        for child in self.html.root_element().children() {
            write_pretty(child, 0, rewrites, &mut out);
        }
        out
    }
}

fn write_pretty(
    node: NodeRef<'_, Node>,
    depth: usize,
    rewrites: &HashMap<String, String>,
    out: &mut String,
) {
    let indent = " ".repeat(depth);
    match node.value() {
        Node::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                out.push_str(&indent);
                out.push_str(&escape_html(text));
                out.push('\n');
            }
        }
        Node::Comment(comment) => {
            out.push_str(&format!("{indent}<!--{}-->\n", &**comment));
        }
        Node::Element(el) => {
            let name = el.name();
            out.push_str(&indent);
            out.push_str(&start_tag(el, rewrites));
            if VOID_ELEMENTS.contains(&name) {
                out.push('\n');
                return;
            }
            if PRESERVE_WHITESPACE.contains(&name) || RAW_TEXT.contains(&name) {
                let raw = RAW_TEXT.contains(&name);
                for child in node.children() {
                    write_verbatim(child, raw, rewrites, out);
                }
                out.push_str(&format!("</{name}>\n"));
                return;
            }
            out.push('\n');
            for child in node.children() {
                write_pretty(child, depth + 1, rewrites, out);
            }
            out.push_str(&format!("{indent}</{name}>\n"));
        }
        _ => {}
    }
}

/// Serialise a subtree without touching whitespace.
fn write_verbatim(
    node: NodeRef<'_, Node>,
    raw_text: bool,
    rewrites: &HashMap<String, String>,
    out: &mut String,
) {
    match node.value() {
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => out.push_str(&escape_html(text)),
        Node::Comment(comment) => out.push_str(&format!("<!--{}-->", &**comment)),
        Node::Element(el) => {
            let name = el.name();
            out.push_str(&start_tag(el, rewrites));
            if VOID_ELEMENTS.contains(&name) {
                return;
            }
            for child in node.children() {
                write_verbatim(child, raw_text, rewrites, out);
            }
            out.push_str(&format!("</{name}>"));
        }
        _ => {}
    }
}

fn start_tag(el: &scraper::node::Element, rewrites: &HashMap<String, String>) -> String {
    let name = el.name();
    let mut tag = format!("<{name}");
    for (attr, value) in el.attrs() {
        let value = match (name, attr) {
            ("img", "src") => rewrites.get(value).map(String::as_str).unwrap_or(value),
            _ => value,
        };
        tag.push_str(&format!(" {attr}=\"{}\"", escape_html(value)));
    }
    if VOID_ELEMENTS.contains(&name) {
        tag.push_str("/>");
    } else {
        tag.push('>');
    }
    tag
}
