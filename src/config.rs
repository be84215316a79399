//! Conversion options.
//!
//! The page layout is fixed; these options only carry the asset locations
//! and table-of-contents settings the pipeline needs. [`ConvertOptions::default`]
//! is what the command-line tool uses.

use std::path::PathBuf;

/// Table-of-contents settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocOptions {
    /// Shallowest heading level listed in the TOC.
    pub min_level: u8,
    /// Deepest heading level listed in the TOC.
    pub max_level: u8,
    /// CSS class of the TOC container; the sidebar looks it up by this class.
    pub class: String,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            min_level: 2,
            max_level: 6,
            class: "sidebar-toc".to_string(),
        }
    }
}

impl TocOptions {
    pub fn includes(&self, level: u8) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }
}

/// Options for a single conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Font embedded in the page, relative to the input file's directory.
    pub font_path: PathBuf,
    /// Logo shown in the header bar, relative to the input file's directory.
    pub logo_path: PathBuf,
    pub toc: TocOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("font").join("Arial.ttf"),
            logo_path: PathBuf::from("image").join("logo.png"),
            toc: TocOptions::default(),
        }
    }
}
