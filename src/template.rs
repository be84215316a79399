//! Page template with named slots.
//!
//! The page layout (`assets/page.html`) and its stylesheet
//! (`assets/page.css`) are static. Dynamic content goes into `{= key =}`
//! slots, filled from a [`TemplateContext`]. [`Page`] names every slot the
//! layout has and renders the final document.
//!
//! ```
//! use mdpage::template::TemplateContext;
//!
//! let mut ctx = TemplateContext::new();
//! ctx.insert("title", "Q&A").insert_html("body", "<p>Hi</p>");
//! assert_eq!(
//!     ctx.resolve("<h1>{= title =}</h1>{= body =}"),
//!     "<h1>Q&amp;A</h1><p>Hi</p>"
//! );
//! ```

use std::collections::HashMap;

/// Static page skeleton.
pub const PAGE_LAYOUT: &str = include_str!("../assets/page.html");

/// Static page stylesheet (layout, sidebar, breakpoints, print rules).
pub const PAGE_CSS: &str = include_str!("../assets/page.css");

/// Heading of the sidebar.
pub const TOC_HEADING: &str = "Содержание";

/// Label in front of the document version in the header.
pub const VERSION_LABEL: &str = "Версия";

/// Text of the placeholder shown when no logo is available.
pub const LOGO_PLACEHOLDER: &str = "ЛОГО";

/// Logo display size in pixels.
pub const LOGO_WIDTH: u32 = 254;
pub const LOGO_HEIGHT: u32 = 84;

/// Context for slot interpolation.
///
/// Values are either text, escaped on output, or trusted markup that is
/// inserted unchanged.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create an empty template context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a text value. It is HTML-escaped when stored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl AsRef<str>) -> &mut Self {
        self.vars.insert(key.into(), escape_html(value.as_ref()));
        self
    }

    /// Insert markup that is emitted verbatim.
    pub fn insert_html(&mut self, key: impl Into<String>, markup: impl Into<String>) -> &mut Self {
        self.vars.insert(key.into(), markup.into());
        self
    }

    /// Resolve `{= key =}` slots in `template`.
    ///
    /// - Missing keys resolve to an empty string.
    /// - Whitespace inside delimiters is trimmed: `{= name =}` and `{=name=}` both work.
    /// - Inserted values are not scanned again.
    pub fn resolve(&self, template: &str) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start_pos) = rest.find("{=") {
            result.push_str(&rest[..start_pos]);

            let after_open = &rest[start_pos + 2..];
            if let Some(end_pos) = after_open.find("=}") {
                let key = after_open[..end_pos].trim();
                if let Some(value) = self.vars.get(key) {
                    result.push_str(value);
                }
                rest = &after_open[end_pos + 2..];
            } else {
                // No closing =}, keep the text as is
                result.push_str("{=");
                rest = after_open;
            }
        }

        result.push_str(rest);
        result
    }
}

/// Escape HTML special characters.
pub(crate) fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Every dynamic part of the generated page.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub version: &'a str,
    /// Embedded font `data:` URI.
    pub font: Option<&'a str>,
    /// Embedded logo `data:` URI.
    pub logo: Option<&'a str>,
    /// TOC container markup for the sidebar.
    pub toc: &'a str,
    /// Body markup for the content pane.
    pub body: &'a str,
}

impl Page<'_> {
    /// Render the complete HTML document.
    pub fn render(&self) -> String {
        let mut ctx = TemplateContext::new();
        ctx.insert("title", self.title)
            .insert("toc_heading", TOC_HEADING)
            .insert_html("font_face", font_face_css(self.font))
            .insert_html("styles", PAGE_CSS)
            .insert_html("logo", logo_html(self.logo))
            .insert_html("product_info", product_info_html(self.author, self.version))
            .insert_html("toc", self.toc)
            .insert_html("body", self.body);
        ctx.resolve(PAGE_LAYOUT)
    }
}

/// `@font-face` rule for the page font.
///
/// The embedded font is used when present; otherwise the rule points at the
/// locally installed Arial.
pub fn font_face_css(font: Option<&str>) -> String {
    match font {
        Some(uri) => format!(
            "@font-face {{
            font-family: 'Arial';
            src: url('{uri}') format('truetype');
            font-weight: normal;
            font-style: normal;
            font-display: swap;
        }}"
        ),
        None => "@font-face {
            font-family: 'Arial';
            src: local('Arial'), local('Arial MT');
            font-weight: normal;
            font-style: normal;
        }"
        .to_string(),
    }
}

/// Header logo: the embedded image, or a grey placeholder of the same size.
pub fn logo_html(logo: Option<&str>) -> String {
    match logo {
        Some(uri) => format!(
            "<img src=\"{}\" alt=\"Logo\" style=\"width: {LOGO_WIDTH}px; height: {LOGO_HEIGHT}px;\">",
            escape_html(uri)
        ),
        None => format!(
            "<div style=\"width: {LOGO_WIDTH}px; height: {LOGO_HEIGHT}px; background: #8B8B8B; \
             color: white; text-align: center; line-height: {LOGO_HEIGHT}px;\">{LOGO_PLACEHOLDER}</div>"
        ),
    }
}

/// Author / version block under the title. Empty when both are empty.
pub fn product_info_html(author: &str, version: &str) -> String {
    if author.is_empty() && version.is_empty() {
        return String::new();
    }
    let mut html =
        String::from("<div style=\"margin-top: 10px; font-size: 12px; line-height: 1.4;\">\n");
    if !author.is_empty() {
        html.push_str(&format!(
            "            <div><strong>{}</strong></div>\n",
            escape_html(author)
        ));
    }
    if !version.is_empty() {
        html.push_str(&format!(
            "            <div>{VERSION_LABEL} {}</div>\n",
            escape_html(version)
        ));
    }
    html.push_str("        </div>");
    html
}
