//! Error and diagnostic types.
//!
//! Fatal failures (reading the input, writing the output) surface as
//! [`Error`]. Recoverable problems never abort a conversion: they are logged
//! through `tracing` and collected as [`Diagnostic`] records on the
//! [`Conversion`](crate::Conversion) so callers can inspect them.

use std::fmt;
use std::path::{Path, PathBuf};

/// Errors that abort a conversion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem I/O error on the input or output document.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The front matter block is not valid YAML or not a mapping.
    #[error("front matter error: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a `std::io::Error` with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// What kind of recoverable problem a [`Diagnostic`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Front matter could not be parsed; defaults were used.
    FrontMatter,
    /// The embedded font was missing or unreadable; a local font is referenced instead.
    MissingFont,
    /// The logo was missing or unreadable; a placeholder block is rendered.
    MissingLogo,
    /// A body image could not be embedded; its `src` was left unchanged.
    MissingImage,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FrontMatter => "front-matter",
            Self::MissingFont => "missing-font",
            Self::MissingLogo => "missing-logo",
            Self::MissingImage => "missing-image",
        }
    }
}

/// A recoverable problem encountered while converting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// File the problem relates to, when there is one.
    pub path: Option<PathBuf>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Log this diagnostic as a warning and hand it back.
    pub(crate) fn warn(self) -> Self {
        match &self.path {
            Some(path) => tracing::warn!(
                kind = self.kind.as_str(),
                path = %path.display(),
                "{}",
                self.message
            ),
            None => tracing::warn!(kind = self.kind.as_str(), "{}", self.message),
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)?;
        if let Some(path) = &self.path {
            write!(f, " ({})", path.display())?;
        }
        Ok(())
    }
}
