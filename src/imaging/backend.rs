//! Image decoding backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the compose/batch flows and
//! the pixel decoders. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests swap in a mock
//! that serves synthetic images without touching the codecs.

use image::DynamicImage;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported image format: {0}")]
    Unsupported(String),
    #[error("Decode failed: {0}")]
    DecodeFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(img: &DynamicImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
        }
    }
}

/// Trait for image decoding backends.
pub trait ImageBackend {
    /// Get image dimensions without keeping the pixels around.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode the file into a pixel buffer.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Lowercase extensions (no dot) this backend can decode.
    fn supported_extensions(&self) -> &[&'static str];
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Mock backend that serves solid-color images by file name and records
    /// every decode request. Names without a registered size fail to decode.
    #[derive(Default)]
    pub struct MockBackend {
        pub sizes: HashMap<String, (u32, u32)>,
        pub decoded: RefCell<Vec<String>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_image(mut self, file_name: &str, width: u32, height: u32) -> Self {
            self.sizes.insert(file_name.to_string(), (width, height));
            self
        }

        pub fn decoded_names(&self) -> Vec<String> {
            self.decoded.borrow().clone()
        }

        fn lookup(&self, path: &Path) -> Result<(u32, u32), BackendError> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.sizes
                .get(&name)
                .copied()
                .ok_or_else(|| BackendError::DecodeFailed(format!("no mock image for {name}")))
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            let (width, height) = self.lookup(path)?;
            Ok(Dimensions { width, height })
        }

        fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.decoded
                .borrow_mut()
                .push(path.to_string_lossy().to_string());
            let (width, height) = self.lookup(path)?;
            Ok(DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
                width,
                height,
                image::Rgb([200, 30, 30]),
            )))
        }

        fn supported_extensions(&self) -> &[&'static str] {
            &["jpg", "jpeg", "png"]
        }
    }

    #[test]
    fn mock_decodes_registered_images() {
        let backend = MockBackend::new().with_image("a.jpg", 40, 30);
        let img = backend.decode(Path::new("/tmp/a.jpg")).unwrap();
        assert_eq!(Dimensions::of(&img), Dimensions { width: 40, height: 30 });
        assert_eq!(backend.decoded_names(), vec!["/tmp/a.jpg"]);
    }

    #[test]
    fn mock_fails_unregistered_images() {
        let backend = MockBackend::new();
        assert!(backend.decode(Path::new("missing.jpg")).is_err());
        assert!(backend.identify(Path::new("missing.jpg")).is_err());
        assert_eq!(backend.decoded_names().len(), 1);
    }
}
