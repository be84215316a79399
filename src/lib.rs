//! `mdpage`: turn one Markdown document into one self-contained HTML page.
//!
//! The pipeline is linear: front matter is split off and parsed into
//! [`Metadata`], the body is rendered with `pulldown-cmark` (heading ids and
//! an optional `[TOC]` container), the TOC is moved into the sidebar, local
//! images plus the page font and logo are inlined as `data:` URIs, and the
//! result is poured into the fixed page template.
//!
//! Problems with optional inputs (bad front matter, missing assets) never
//! abort a conversion. They are logged through `tracing` and returned as
//! [`Diagnostic`]s.
//!
//! # Quick start
//!
//! ```
//! use std::path::Path;
//!
//! let md = "---\ntitle: Manual\n---\n[TOC]\n\n## Install\n\nRun it.\n";
//! let conversion = mdpage::convert_str(md, Path::new("."), &mdpage::ConvertOptions::default());
//! assert!(conversion.html.contains("<title>Manual</title>"));
//! assert!(conversion.html.contains("<a href=\"#install\">Install</a>"));
//! ```

pub mod config;
pub mod embed;
pub mod error;
pub mod fragment;
pub mod front_matter;
pub mod render_html;
pub mod template;
pub mod toc;

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

pub use config::{ConvertOptions, TocOptions};
pub use error::{Diagnostic, DiagnosticKind, Error, Result};
pub use front_matter::Metadata;

use embed::Assets;
use fragment::Fragment;
use template::Page;

/// Outcome of a conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The complete HTML document.
    pub html: String,
    pub metadata: Metadata,
    /// Recoverable problems, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert Markdown text already in memory.
///
/// `base_dir` is the directory the font, logo and relative image paths are
/// resolved against, normally the input file's directory.
pub fn convert_str(text: &str, base_dir: &Path, options: &ConvertOptions) -> Conversion {
    let text = normalize_newlines(text);
    let front_matter = front_matter::extract(&text);
    let mut diagnostics: Vec<Diagnostic> = front_matter.diagnostic.into_iter().collect();

    let rendered = render_html::render_markdown(front_matter.body, &options.toc);
    let mut fragment = Fragment::parse(&rendered);
    let toc = fragment.take_toc(&options.toc.class).unwrap_or_default();
    debug!(has_toc = !toc.is_empty(), "body rendered");

    let (assets, asset_diagnostics) = Assets::locate(base_dir, options);
    diagnostics.extend(asset_diagnostics);

    let images = embed::inline_images(&fragment.image_sources(), base_dir);
    debug!(embedded = images.rewrites.len(), "body images processed");
    diagnostics.extend(images.diagnostics);

    let body = fragment.prettify(&images.rewrites);
    let metadata = front_matter.metadata;
    let html = Page {
        title: &metadata.title,
        author: &metadata.author,
        version: &metadata.version,
        font: assets.font.as_deref(),
        logo: assets.logo.as_deref(),
        toc: &toc,
        body: &body,
    }
    .render();

    Conversion {
        html,
        metadata,
        diagnostics,
    }
}

/// Convert `input` and write the page to `output`, replacing any existing file.
///
/// Only reading the input and writing the output can fail.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn convert_file(input: &Path, output: &Path, options: &ConvertOptions) -> Result<Conversion> {
    let text = fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
    let base_dir = input.parent().unwrap_or_else(|| Path::new(""));

    let conversion = convert_str(&text, base_dir, options);

    fs::write(output, &conversion.html).map_err(|e| Error::io(output, e))?;
    info!(
        bytes = conversion.html.len(),
        warnings = conversion.diagnostics.len(),
        "page written"
    );
    Ok(conversion)
}

/// Normalise `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_normalisation() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
        assert!(matches!(normalize_newlines("plain\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn crlf_front_matter_is_recognised() {
        let conversion = convert_str(
            "---\r\ntitle: Windows\r\n---\r\nBody\r\n",
            Path::new("/nonexistent-mdpage-dir"),
            &ConvertOptions::default(),
        );
        assert_eq!(conversion.metadata.title, "Windows");
    }

    #[test]
    fn diagnostics_follow_pipeline_order() {
        let conversion = convert_str(
            "---\n: [\n---\n![x](nope.png)\n",
            Path::new("/nonexistent-mdpage-dir"),
            &ConvertOptions::default(),
        );
        let kinds: Vec<_> = conversion.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::FrontMatter,
                DiagnosticKind::MissingFont,
                DiagnosticKind::MissingLogo,
                DiagnosticKind::MissingImage,
            ]
        );
    }
}
