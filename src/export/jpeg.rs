//! Raster sheet: a white 3300×2550 canvas with both photos pasted on.
//!
//! The canvas is built with `image`; encoding goes through `jpeg-encoder`
//! with optimized Huffman tables.

use super::ExportError;
use crate::imaging::{Dimensions, Quality};
use crate::layout::{JPEG_SHEET, layout_pixels};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use jpeg_encoder::{ColorType, Encoder};
use std::io::Write;
use std::path::Path;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Compose the sheet in memory. Alpha is dropped before resampling.
pub fn render_sheet(before: &DynamicImage, after: &DynamicImage, scale_factor: f64) -> RgbImage {
    let layout = layout_pixels(
        JPEG_SHEET,
        Dimensions::of(before),
        Dimensions::of(after),
        scale_factor,
    );

    let mut sheet = RgbImage::from_pixel(JPEG_SHEET.width, JPEG_SHEET.height, BACKGROUND);
    for (img, place) in [(before, layout.before), (after, layout.after)] {
        let resized = imageops::resize(
            &img.to_rgb8(),
            place.width,
            place.height,
            FilterType::Lanczos3,
        );
        imageops::replace(&mut sheet, &resized, place.x as i64, place.y as i64);
    }
    sheet
}

fn encode_jpeg<W: Write>(
    sheet: &RgbImage,
    out: W,
    quality: Quality,
    optimize: bool,
) -> Result<(), ExportError> {
    let dim = |v: u32| {
        u16::try_from(v).map_err(|_| ExportError::Encode(format!("{v}px is too large for JPEG")))
    };
    let (width, height) = (dim(sheet.width())?, dim(sheet.height())?);

    let mut encoder = Encoder::new(out, quality.value());
    encoder.set_optimized_huffman_tables(optimize);
    encoder
        .encode(sheet.as_raw(), width, height, ColorType::Rgb)
        .map_err(|e| ExportError::Encode(e.to_string()))
}

pub fn write_jpeg(sheet: &RgbImage, path: &Path, quality: Quality) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    encode_jpeg(sheet, &mut writer, quality, true)?;
    writer.flush()?;
    Ok(())
}
