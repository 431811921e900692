//! Single-pair export: load, crop, name, write.
//!
//! ```text
//! before.jpg ─ load ─ crop? ─┐
//!                            ├─ layout ─ export ─→ out_dir/<name>.<pdf|jpg>
//! after.jpg  ─ load ─ crop? ─┘
//! ```
//!
//! Both images must load before anything is written. The output name is the
//! first of: the caller's explicit name, a name built from the patient
//! identity in the filenames, or `{before_stem}_vs_{after_stem}`.

use crate::export::{ExportError, ExportFormat, ExportOptions, export_pair};
use crate::imaging::{CropParams, ImageBackend, crop_top_then_bottom, load_image};
use crate::naming::{NameParts, compose_basename, fallback_stem_name, suggest_identity};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Before => write!(f, "before"),
            Side::After => write!(f, "after"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Missing {0} image (file unreadable or unsupported)")]
    MissingImage(Side),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// One before/after export.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub before: PathBuf,
    pub after: PathBuf,
    pub crop_before: CropParams,
    pub crop_after: CropParams,
    pub out_dir: PathBuf,
    /// Explicit output basename; the extension is forced either way.
    pub file_name: Option<String>,
    pub format: ExportFormat,
    pub options: ExportOptions,
    pub name_parts: NameParts,
}

pub(crate) fn file_name_str(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Output basename for the request, without extension.
pub fn resolve_output_name(request: &ComposeRequest) -> String {
    if let Some(name) = request
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        return name.to_string();
    }
    match suggest_identity(&file_name_str(&request.before), &file_name_str(&request.after)) {
        Some(identity) => compose_basename(&identity, request.name_parts),
        None => fallback_stem_name(&request.before, &request.after),
    }
}

/// Run one export and return the path written.
pub fn compose_pair(
    backend: &impl ImageBackend,
    request: &ComposeRequest,
) -> Result<PathBuf, ComposeError> {
    let before =
        load_image(backend, &request.before).ok_or(ComposeError::MissingImage(Side::Before))?;
    let after =
        load_image(backend, &request.after).ok_or(ComposeError::MissingImage(Side::After))?;

    let before = crop_top_then_bottom(&before, request.crop_before);
    let after = crop_top_then_bottom(&after, request.crop_after);

    let target = request.out_dir.join(resolve_output_name(request));
    let written = export_pair(request.format, &target, &before, &after, &request.options)?;
    Ok(written)
}
