//! Shared test utilities for the ortho-baa test suite.
//!
//! Synthetic image writers and folder builders so tests never depend on
//! checked-in photos.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = pair_folder(&[("Smith-Before.jpg", 40, 30), ("Smith-After.jpg", 40, 30)]);
//! let pairs = guess_pairs(tmp.path(), &["jpg"]).unwrap();
//! assert_eq!(
//!     pair_names(&pairs),
//!     triples(&[("Smith-Before.jpg", "Smith-After.jpg", "Smith")])
//! );
//! ```

use image::{DynamicImage, ImageEncoder, RgbImage};
use std::path::Path;
use tempfile::TempDir;

use crate::scan::Pair;

// =========================================================================
// Image writers
// =========================================================================

/// Gradient test pattern so resampling has something to chew on.
pub fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

/// Write a small valid JPEG with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = test_image(width, height).to_rgb8();
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid PNG with the given dimensions.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    test_image(width, height).save(path).unwrap();
}

// =========================================================================
// Folder fixtures
// =========================================================================

/// Temp folder holding one real image per `(name, width, height)` entry.
/// `.png` names are written as PNG, everything else as JPEG bytes.
pub fn pair_folder(files: &[(&str, u32, u32)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (name, w, h) in files {
        let path = tmp.path().join(name);
        if name.to_ascii_lowercase().ends_with(".png") {
            write_test_png(&path, *w, *h);
        } else {
            write_test_jpeg(&path, *w, *h);
        }
    }
    tmp
}

/// Temp folder with empty files; enough for pairing tests that never decode.
pub fn empty_files(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for name in names {
        std::fs::write(tmp.path().join(name), b"").unwrap();
    }
    tmp
}

// =========================================================================
// Pair extractors
// =========================================================================

/// `(before file name, after file name, base name)` for each pair.
pub fn pair_names(pairs: &[Pair]) -> Vec<(String, String, String)> {
    pairs
        .iter()
        .map(|p| (file_name(&p.before), file_name(&p.after), p.base_name.clone()))
        .collect()
}

/// Owned copy of expected pair triples, for comparing with [`pair_names`].
pub fn triples(expected: &[(&str, &str, &str)]) -> Vec<(String, String, String)> {
    expected
        .iter()
        .map(|(b, a, n)| (b.to_string(), a.to_string(), n.to_string()))
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| panic!("no file name in {}", path.display()))
}
