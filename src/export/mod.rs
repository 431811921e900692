//! Writing a composed before/after page to disk.
//!
//! | Format | Canvas | Backend |
//! |---|---|---|
//! | PDF | 792×612pt, 24pt margin | `lopdf` page with two Flate-compressed RGB XObjects |
//! | JPEG | 3300×2550px, 90px margin | `image` Lanczos3 resize onto a white sheet |
//!
//! Both share [`crate::layout`]; they differ only in canvas and rounding.
//! The output extension always follows the format, whatever the caller
//! typed.

mod jpeg;
mod pdf;

pub use jpeg::{render_sheet, write_jpeg};
pub use pdf::{render_pdf, write_pdf};

use crate::imaging::Quality;
use crate::layout::DEFAULT_SCALE_FACTOR;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "PDF", alias = "pdf")]
    Pdf,
    #[serde(rename = "JPEG", alias = "jpeg", alias = "JPG", alias = "jpg")]
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Pdf => write!(f, "PDF"),
            ExportFormat::Jpeg => write!(f, "JPEG"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            other => Err(format!("unknown output format '{other}' (expected PDF or JPEG)")),
        }
    }
}

/// Knobs shared by both exporters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Shrink applied after fit-to-box; expected in (0, 1].
    pub scale_factor: f64,
    /// Only used by the JPEG exporter.
    pub jpeg_quality: Quality,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            jpeg_quality: Quality::default(),
        }
    }
}

/// Extensions that get replaced rather than appended to.
const REPLACEABLE_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp", "heic", "heif", "avif",
];

/// Give `path` the format's extension.
///
/// A known document/image extension is swapped; anything else after a dot
/// is treated as part of the name (`Dr. Smith` → `Dr. Smith.pdf`).
pub fn force_extension(path: &Path, format: ExportFormat) -> PathBuf {
    let replace = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| REPLACEABLE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    if replace {
        return path.with_extension(format.extension());
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Render and write one before/after page, returning the path written.
///
/// Missing parent directories are created. An existing file is overwritten.
pub fn export_pair(
    format: ExportFormat,
    out_path: &Path,
    before: &DynamicImage,
    after: &DynamicImage,
    options: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    let path = force_extension(out_path, format);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        ExportFormat::Pdf => {
            let mut doc = render_pdf(before, after, options.scale_factor)?;
            write_pdf(&mut doc, &path)?;
        }
        ExportFormat::Jpeg => {
            let sheet = render_sheet(before, after, options.scale_factor);
            write_jpeg(&sheet, &path, options.jpeg_quality)?;
        }
    }

    tracing::info!(path = %path.display(), %format, "exported");
    Ok(path)
}
