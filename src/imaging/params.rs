//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are created
//! per invocation from CLI flags or [`AppConfig`](crate::config::AppConfig)
//! defaults and carry no identity of their own.
//!
//! ## Types
//!
//! - [`CropParams`] — The two-stage vertical crop (keep top N, then bottom M).
//! - [`Quality`] — Lossy encoding quality (1–100, default 92). Clamped on construction.

/// Two-stage vertical crop: keep the top `top` rows, then the bottom
/// `bottom` rows of that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropParams {
    pub enabled: bool,
    pub top: u32,
    pub bottom: u32,
}

impl CropParams {
    /// An enabled crop with the given row counts.
    pub fn new(top: u32, bottom: u32) -> Self {
        Self {
            enabled: true,
            top,
            bottom,
        }
    }

    /// A crop that leaves the image untouched.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            top: 1,
            bottom: 1,
        }
    }
}

impl Default for CropParams {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(92)
    }
}
