//! Image decoding and cropping — pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` / AVIF container metadata |
//! | **Decode** | `image::ImageReader`, `rav1d` for AVIF |
//! | **Crop** | `DynamicImage::crop_imm` over a computed row window |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for fit and crop math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{crop_window, fit_rect};
pub use operations::{crop_top_then_bottom, load_image};
pub use params::{CropParams, Quality};
pub use rust_backend::{Capabilities, KNOWN_INPUT_EXTENSIONS, RustBackend};
