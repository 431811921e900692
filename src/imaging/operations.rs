//! High-level image operations.
//!
//! These functions combine calculations with backend execution. Loading never
//! raises: an unreadable or unsupported file is simply "no image", and the
//! caller decides how to report it.

use super::backend::ImageBackend;
use super::calculations::crop_window;
use super::params::CropParams;
use image::DynamicImage;
use std::borrow::Cow;
use std::path::Path;

/// Decode `path`, or `None` when it is missing, unsupported, or corrupt.
pub fn load_image(backend: &impl ImageBackend, path: &Path) -> Option<DynamicImage> {
    match backend.decode(path) {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "image not loaded");
            None
        }
    }
}

/// Apply the two-stage vertical crop (keep top N rows, then bottom M of that).
///
/// A disabled crop borrows the input; otherwise a new buffer is produced.
/// Width is never altered.
pub fn crop_top_then_bottom(img: &DynamicImage, params: CropParams) -> Cow<'_, DynamicImage> {
    if !params.enabled {
        return Cow::Borrowed(img);
    }
    let (y, height) = crop_window(img.height(), params);
    Cow::Owned(img.crop_imm(0, y, img.width(), height))
}
