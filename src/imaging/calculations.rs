//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::CropParams;

/// Scale `(width, height)` to the largest size that fits inside the box
/// without distortion.
///
/// The image is scaled up as well as down: the limiting dimension always
/// fills the box. A non-positive source dimension has no meaningful aspect
/// ratio, so the box itself is returned.
///
/// # Examples
/// ```
/// # use ortho_baa::imaging::fit_rect;
/// // 400x300 into a 200x200 box → width-limited
/// assert_eq!(fit_rect(400.0, 300.0, 200.0, 200.0), (200.0, 150.0));
///
/// // degenerate input falls back to the box
/// assert_eq!(fit_rect(0.0, 100.0, 372.0, 564.0), (372.0, 564.0));
/// ```
pub fn fit_rect(width: f64, height: f64, box_width: f64, box_height: f64) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (box_width, box_height);
    }
    let scale = (box_width / width).min(box_height / height);
    (width * scale, height * scale)
}

/// Rows kept by the two-stage crop, as `(first_row, row_count)`.
///
/// Stage 1 keeps the top `params.top` rows (clamped to the image height).
/// Stage 2 keeps the bottom `params.bottom` rows of that, but only when it
/// actually shrinks the stage-1 result.
pub fn crop_window(height: u32, params: CropParams) -> (u32, u32) {
    if !params.enabled {
        return (0, height);
    }
    let stage1 = params.top.min(height);
    if stage1 > params.bottom {
        (stage1 - params.bottom, params.bottom)
    } else {
        (0, stage1)
    }
}
