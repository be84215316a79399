//! Asset embedding as `data:` URIs.
//!
//! Fonts, the header logo and body images are read from disk and inlined
//! as base64 so the generated page has no external file references. A
//! missing or unreadable asset is never fatal: it produces a [`Diagnostic`]
//! and the caller substitutes a fallback.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::config::ConvertOptions;
use crate::error::{Diagnostic, DiagnosticKind, Error, Result};

/// MIME type for extensions outside the table.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// MIME type inferred from the file extension (case-insensitive).
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => FALLBACK_MIME,
    }
}

/// Format bytes as a base64 `data:` URI.
pub fn encode(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Read a file and return it as a `data:` URI.
pub fn data_uri(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "embedding asset");
    Ok(encode(&bytes, mime_for(path)))
}

/// Whether an image source points at the web and must be left alone.
pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Page-level assets found next to the input document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assets {
    /// Embedded font, `None` when the local-font fallback must be used.
    pub font: Option<String>,
    /// Embedded logo, `None` when the placeholder block must be used.
    pub logo: Option<String>,
}

impl Assets {
    /// Look up the font and logo relative to `base_dir`.
    pub fn locate(base_dir: &Path, options: &ConvertOptions) -> (Self, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();

        let font_path = base_dir.join(&options.font_path);
        let font = embed_or_report(&font_path, &mut diagnostics, |err| {
            Diagnostic::new(
                DiagnosticKind::MissingFont,
                format!("font not embedded, falling back to the system Arial: {err}"),
            )
        });

        let logo_path = base_dir.join(&options.logo_path);
        let logo = embed_or_report(&logo_path, &mut diagnostics, |err| {
            Diagnostic::new(
                DiagnosticKind::MissingLogo,
                format!("logo not embedded, using a placeholder: {err}"),
            )
        });

        (Self { font, logo }, diagnostics)
    }
}

fn embed_or_report(
    path: &Path,
    diagnostics: &mut Vec<Diagnostic>,
    report: impl FnOnce(&Error) -> Diagnostic,
) -> Option<String> {
    match data_uri(path) {
        Ok(uri) => Some(uri),
        Err(err) => {
            diagnostics.push(report(&err).with_path(path).warn());
            None
        }
    }
}

/// Outcome of [`inline_images`].
#[derive(Debug, Clone, Default)]
pub struct InlinedImages {
    /// Original `src` to `data:` URI, for every image that could be embedded.
    pub rewrites: HashMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Embed every local image source, resolved relative to `base_dir`.
///
/// Remote (`http://`, `https://`) and already-inlined (`data:`) sources are
/// skipped. A source that cannot be read keeps its original value and
/// yields one diagnostic.
pub fn inline_images(sources: &[String], base_dir: &Path) -> InlinedImages {
    let mut result = InlinedImages::default();
    let mut seen = HashSet::new();

    for src in sources {
        if src.is_empty() || is_remote(src) || src.starts_with("data:") {
            continue;
        }
        if !seen.insert(src.as_str()) {
            continue;
        }

        let Some(path) = resolve_image(src, base_dir) else {
            result.diagnostics.push(
                Diagnostic::new(DiagnosticKind::MissingImage, format!("image not found: {src}"))
                    .with_path(base_dir.join(src))
                    .warn(),
            );
            continue;
        };

        match data_uri(&path) {
            Ok(uri) => {
                result.rewrites.insert(src.clone(), uri);
            }
            Err(err) => result.diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::MissingImage,
                    format!("failed to embed image {src}: {err}"),
                )
                .with_path(&path)
                .warn(),
            ),
        }
    }
    result
}

/// First existing file for `src`: taken literally, then percent-decoded.
fn resolve_image(src: &str, base_dir: &Path) -> Option<PathBuf> {
    let literal = base_dir.join(src);
    if literal.is_file() {
        return Some(literal);
    }
    let decoded = percent_decode_str(src).decode_utf8().ok()?;
    if decoded == src {
        return None;
    }
    let decoded = base_dir.join(&*decoded);
    decoded.is_file().then_some(decoded)
}
