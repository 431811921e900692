//! Batch export over guessed pairs.
//!
//! Pairs are processed strictly one after another with shared settings. A
//! pair that fails (undecodable image, write error) is reported and skipped;
//! the batch always runs to the end. Progress is pushed to the caller through
//! a callback so the CLI can print as it goes.
//!
//! Output names come from the patient identity in the filenames when one
//! parses, otherwise `{base_name}_BeforeAndAfter`. Two pairs that resolve to
//! the same name overwrite each other; the later one wins.

use crate::compose::file_name_str;
use crate::export::{ExportError, ExportFormat, ExportOptions, export_pair};
use crate::imaging::{CropParams, ImageBackend, crop_top_then_bottom, load_image};
use crate::naming::{NameParts, PAIR_SUFFIX, compose_basename, suggest_identity};
use crate::scan::Pair;
use std::path::PathBuf;
use thiserror::Error;

/// Why one pair of a batch was skipped.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("cannot load {}", .0.display())]
    Load(PathBuf),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Settings shared by every pair in a run.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub out_dir: PathBuf,
    pub format: ExportFormat,
    pub options: ExportOptions,
    pub crop_before: CropParams,
    pub crop_after: CropParams,
    pub name_parts: NameParts,
}

/// Progress events. `index` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    PairWritten {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    PairSkipped {
        index: usize,
        total: usize,
        before: PathBuf,
        after: PathBuf,
        reason: String,
    },
}

impl BatchEvent {
    /// Whole-number percent complete after this event.
    pub fn percent(&self) -> usize {
        match self {
            BatchEvent::Started { .. } => 0,
            BatchEvent::PairWritten { index, total, .. }
            | BatchEvent::PairSkipped { index, total, .. } => index * 100 / (*total).max(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub skipped: usize,
}

/// Output basename for one pair.
pub fn batch_output_name(pair: &Pair, parts: NameParts) -> String {
    match suggest_identity(&file_name_str(&pair.before), &file_name_str(&pair.after)) {
        Some(identity) => compose_basename(&identity, parts),
        None => format!("{}{PAIR_SUFFIX}", pair.base_name),
    }
}

fn export_one(
    backend: &impl ImageBackend,
    pair: &Pair,
    settings: &BatchSettings,
) -> Result<PathBuf, BatchError> {
    let before =
        load_image(backend, &pair.before).ok_or_else(|| BatchError::Load(pair.before.clone()))?;
    let after =
        load_image(backend, &pair.after).ok_or_else(|| BatchError::Load(pair.after.clone()))?;
    let before = crop_top_then_bottom(&before, settings.crop_before);
    let after = crop_top_then_bottom(&after, settings.crop_after);

    let target = settings
        .out_dir
        .join(batch_output_name(pair, settings.name_parts));
    let written = export_pair(settings.format, &target, &before, &after, &settings.options)?;
    Ok(written)
}

/// Export every pair, reporting progress through `on_event`.
pub fn run_batch(
    backend: &impl ImageBackend,
    pairs: &[Pair],
    settings: &BatchSettings,
    mut on_event: impl FnMut(&BatchEvent),
) -> BatchSummary {
    let total = pairs.len();
    on_event(&BatchEvent::Started { total });

    let mut summary = BatchSummary::default();
    for (i, pair) in pairs.iter().enumerate() {
        let index = i + 1;
        tracing::debug!(index, total, before = %pair.before.display(), "batch pair");
        let event = match export_one(backend, pair, settings) {
            Ok(path) => {
                summary.written.push(path.clone());
                BatchEvent::PairWritten { index, total, path }
            }
            Err(e) => {
                tracing::debug!(before = %pair.before.display(), error = %e, "pair skipped");
                summary.skipped += 1;
                BatchEvent::PairSkipped {
                    index,
                    total,
                    before: pair.before.clone(),
                    after: pair.after.clone(),
                    reason: e.to_string(),
                }
            }
        };
        on_event(&event);
    }
    summary
}
