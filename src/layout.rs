//! Side-by-side page layout.
//!
//! A canvas is split into two equal halves inside its margin. Each image is
//! fitted into its half without distortion, shrunk by a global scale factor,
//! and centered in both directions:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ margin                                       │
//! │   ┌───── half ─────┐┌───── half ─────┐       │
//! │   │   ┌────────┐   ││  ┌──────────┐  │       │
//! │   │   │ before │   ││  │  after   │  │ draw  │
//! │   │   └────────┘   ││  └──────────┘  │ height│
//! │   └────────────────┘└────────────────┘       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Two flavors share the same math: [`layout_side_by_side`] in floating point
//! for the PDF page, and [`layout_pixels`] with integer truncation for the
//! raster sheet.

use crate::imaging::{Dimensions, fit_rect};

/// Default shrink applied after fit-to-box, leaving a visible frame.
pub const DEFAULT_SCALE_FACTOR: f64 = 0.85;

/// US Letter landscape in points, 24pt margin.
pub const PDF_PAGE: Canvas = Canvas {
    width: 792.0,
    height: 612.0,
    margin: 24.0,
};

/// 11×8.5in at 300dpi, ~0.3in margin.
pub const JPEG_SHEET: PixelCanvas = PixelCanvas {
    width: 3300,
    height: 2550,
    margin: 90,
};

/// Fitted size of one image, before placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub width: f64,
    pub height: f64,
}

/// Position and size of one image on a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Canvas {
    pub fn half_width(&self) -> f64 {
        (self.width - 2.0 * self.margin) / 2.0
    }

    pub fn draw_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }
}

/// A before/after pair of anything: placements, paths, images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideBySide<T> {
    pub before: T,
    pub after: T,
}

/// Fit `dims` into the box, then apply the scale factor.
pub fn fit_scaled(dims: Dimensions, box_width: f64, box_height: f64, scale: f64) -> FitRect {
    let (w, h) = fit_rect(dims.width as f64, dims.height as f64, box_width, box_height);
    FitRect {
        width: w * scale,
        height: h * scale,
    }
}

/// Floating-point placements for the before (left) and after (right) images.
pub fn layout_side_by_side(
    canvas: Canvas,
    before: Dimensions,
    after: Dimensions,
    scale: f64,
) -> SideBySide<Placement> {
    let half = canvas.half_width();
    let draw_h = canvas.draw_height();

    let place = |dims: Dimensions, half_origin: f64| {
        let fit = fit_scaled(dims, half, draw_h, scale);
        Placement {
            x: half_origin + (half - fit.width) / 2.0,
            y: canvas.margin + (draw_h - fit.height) / 2.0,
            width: fit.width,
            height: fit.height,
        }
    };

    SideBySide {
        before: place(before, canvas.margin),
        after: place(after, canvas.margin + half),
    }
}

/// Integer canvas for raster output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCanvas {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
}

impl PixelCanvas {
    pub fn half_width(&self) -> u32 {
        self.width.saturating_sub(2 * self.margin) / 2
    }

    pub fn draw_height(&self) -> u32 {
        self.height.saturating_sub(2 * self.margin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPlacement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Integer placements: fitted sizes truncate after scaling (never below
/// 1px), offsets use integer division.
pub fn layout_pixels(
    canvas: PixelCanvas,
    before: Dimensions,
    after: Dimensions,
    scale: f64,
) -> SideBySide<PixelPlacement> {
    let half = canvas.half_width();
    let draw_h = canvas.draw_height();

    let place = |dims: Dimensions, half_origin: u32| {
        let fit = fit_scaled(dims, half as f64, draw_h as f64, scale);
        let width = (fit.width as u32).max(1);
        let height = (fit.height as u32).max(1);
        PixelPlacement {
            x: half_origin + half.saturating_sub(width) / 2,
            y: canvas.margin + draw_h.saturating_sub(height) / 2,
            width,
            height,
        }
    };

    SideBySide {
        before: place(before, canvas.margin),
        after: place(after, canvas.margin + half),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn pdf_page_geometry() {
        assert_eq!(PDF_PAGE.half_width(), 372.0);
        assert_eq!(PDF_PAGE.draw_height(), 564.0);
    }

    #[test]
    fn jpeg_sheet_geometry() {
        assert_eq!(JPEG_SHEET.half_width(), 1560);
        assert_eq!(JPEG_SHEET.draw_height(), 2370);
    }

    #[test]
    fn square_images_on_pdf_page() {
        let layout = layout_side_by_side(PDF_PAGE, dims(1000, 1000), dims(1000, 1000), 0.85);

        assert!(approx(layout.before.width, 316.2));
        assert!(approx(layout.before.height, 316.2));
        assert!(approx(layout.before.x, 51.9));
        assert!(approx(layout.before.y, 147.9));

        assert!(approx(layout.after.x, 423.9));
        assert!(approx(layout.after.y, layout.before.y));
    }

    #[test]
    fn mixed_aspects_are_centered_independently() {
        let layout = layout_side_by_side(PDF_PAGE, dims(4000, 3000), dims(1000, 2000), 0.85);

        assert!(approx(layout.before.height, 237.15));
        assert!(approx(layout.before.y, 187.425));

        // Portrait is height-limited: 564 * 0.85 tall
        assert!(approx(layout.after.height, 479.4));
        assert!(approx(layout.after.width, 239.7));
        assert!(approx(layout.after.x, 462.15));
    }

    #[test]
    fn scale_one_fills_the_half() {
        let layout = layout_side_by_side(PDF_PAGE, dims(372, 100), dims(10, 564), 1.0);
        assert!(approx(layout.before.x, PDF_PAGE.margin));
        assert!(approx(layout.before.width, 372.0));
        assert!(approx(layout.after.height, 564.0));
        assert!(approx(layout.after.y, PDF_PAGE.margin));
    }

    #[test]
    fn placements_never_overlap() {
        let shapes = [
            dims(1, 1),
            dims(4000, 3000),
            dims(3000, 4000),
            dims(10_000, 10),
            dims(10, 10_000),
            dims(3024, 3020),
        ];
        let canvases = [
            PDF_PAGE,
            Canvas {
                width: 100.0,
                height: 1000.0,
                margin: 0.0,
            },
            Canvas {
                width: 5000.0,
                height: 50.0,
                margin: 10.0,
            },
        ];
        for canvas in canvases {
            for scale in [0.01, 0.5, 0.85, 1.0] {
                for b in shapes {
                    for a in shapes {
                        let layout = layout_side_by_side(canvas, b, a, scale);
                        assert!(
                            !layout.before.overlaps(&layout.after),
                            "{b:?} / {a:?} overlap at scale {scale} on {canvas:?}"
                        );
                        assert!(layout.before.x + layout.before.width <= canvas.width / 2.0 + 1e-9);
                        assert!(layout.after.x >= canvas.width / 2.0 - 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn pixel_layout_on_jpeg_sheet() {
        let layout = layout_pixels(JPEG_SHEET, dims(4000, 3000), dims(3000, 4000), 0.85);

        assert_eq!(
            layout.before,
            PixelPlacement {
                x: 207,
                y: 778,
                width: 1326,
                height: 994
            }
        );
        assert_eq!(
            layout.after,
            PixelPlacement {
                x: 1767,
                y: 391,
                width: 1326,
                height: 1768
            }
        );
    }

    #[test]
    fn pixel_layout_stays_on_sheet() {
        for shape in [dims(1, 1), dims(50_000, 3), dims(3, 50_000), dims(3024, 3020)] {
            let layout = layout_pixels(JPEG_SHEET, shape, shape, 1.0);
            for p in [layout.before, layout.after] {
                assert!(p.width >= 1 && p.height >= 1);
                assert!(p.x + p.width <= JPEG_SHEET.width - JPEG_SHEET.margin);
                assert!(p.y + p.height <= JPEG_SHEET.height - JPEG_SHEET.margin);
            }
            assert!(layout.before.x + layout.before.width <= layout.after.x);
        }
    }
}
