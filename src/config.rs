//! Persisted application settings.
//!
//! A single TOML file remembers what the user chose last time: where output
//! went, which format, how much to crop. It lives at
//! `$XDG_CONFIG_HOME/ortho-baa/config.toml` (or `~/.config/ortho-baa/...`)
//! unless `--config` points elsewhere.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//! last_out_dir = "~/Documents/IPA Fixer/Before and After"
//! scale_factor = 0.85       # Shrink after fit-to-half, in (0, 1]
//! output_format = "PDF"     # "PDF" or "JPEG"
//! jpeg_quality = 92         # 1-100
//!
//! [crop_defaults]
//! top = 3250                # Keep the top N rows...
//! bottom = 3020             # ...then the bottom N rows of that
//!
//! [name_parts]
//! use_id = true
//! use_first = true
//! use_last = true
//! ```
//!
//! ## Leniency
//!
//! Loading never fails. A missing or unparsable file yields the defaults;
//! a single bad value (wrong type, out of range) falls back to its own
//! default while every other field is kept. Unknown keys are ignored so an
//! older binary can read a newer file.
//!
//! Saving is best effort: a failure is logged and otherwise ignored.

use crate::export::{ExportFormat, ExportOptions};
use crate::imaging::{CropParams, Quality};
use crate::layout::DEFAULT_SCALE_FACTOR;
use crate::naming::NameParts;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Directory name under the platform config root.
pub const APP_DIR: &str = "ortho-baa";
pub const CONFIG_FILE: &str = "config.toml";

/// Rows kept by the two-stage crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropDefaults {
    pub top: u32,
    pub bottom: u32,
}

impl Default for CropDefaults {
    fn default() -> Self {
        Self {
            top: 3250,
            bottom: 3020,
        }
    }
}

/// Everything remembered between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub last_out_dir: PathBuf,
    pub scale_factor: f64,
    pub output_format: ExportFormat,
    pub jpeg_quality: u8,
    pub crop_defaults: CropDefaults,
    pub name_parts: NameParts,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_out_dir: default_out_dir(),
            scale_factor: DEFAULT_SCALE_FACTOR,
            output_format: ExportFormat::default(),
            jpeg_quality: Quality::default().value(),
            crop_defaults: CropDefaults::default(),
            name_parts: NameParts::default(),
        }
    }
}

impl AppConfig {
    /// Enabled crop using the remembered row counts.
    pub fn crop_params(&self) -> CropParams {
        CropParams::new(self.crop_defaults.top, self.crop_defaults.bottom)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            scale_factor: self.scale_factor,
            jpeg_quality: Quality::new(self.jpeg_quality as u32),
        }
    }
}

/// `~/Documents/IPA Fixer/Before and After`, or a relative folder when no
/// home directory is known.
pub fn default_out_dir() -> PathBuf {
    let base = std::env::var_os("HOME")
        .map(|h| PathBuf::from(h).join("Documents"))
        .unwrap_or_default();
    base.join("IPA Fixer").join("Before and After")
}

/// Resolve the config file location from XDG/HOME values.
///
/// An empty or relative `XDG_CONFIG_HOME` is ignored, as the XDG base
/// directory rules require.
pub fn config_path_from(
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Option<PathBuf> {
    let root = xdg_config_home
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| home.map(|h| PathBuf::from(h).join(".config")))?;
    Some(root.join(APP_DIR).join(CONFIG_FILE))
}

/// Config file location for this user, if one can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    config_path_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

/// Read the file as a raw TOML table.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Deserialize one key, `None` if absent or the wrong shape.
fn field<T: DeserializeOwned>(table: &toml::Value, key: &str) -> Option<T> {
    let value = table.get(key)?;
    match value.clone().try_into() {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed config value");
            None
        }
    }
}

/// Build a config from a raw table, field by field, keeping defaults for
/// anything missing or invalid.
pub fn resolve_config(raw: &toml::Value) -> AppConfig {
    let defaults = AppConfig::default();

    let scale_factor = field::<f64>(raw, "scale_factor")
        .filter(|s| s.is_finite() && *s > 0.0 && *s <= 1.0)
        .unwrap_or(defaults.scale_factor);
    let jpeg_quality = field::<i64>(raw, "jpeg_quality")
        .filter(|q| (1..=100).contains(q))
        .map(|q| q as u8)
        .unwrap_or(defaults.jpeg_quality);

    let crop_defaults = match raw.get("crop_defaults") {
        Some(crop) => {
            let rows = |key, default| {
                field::<i64>(crop, key)
                    .filter(|n| *n >= 1 && *n <= u32::MAX as i64)
                    .map(|n| n as u32)
                    .unwrap_or(default)
            };
            CropDefaults {
                top: rows("top", defaults.crop_defaults.top),
                bottom: rows("bottom", defaults.crop_defaults.bottom),
            }
        }
        None => defaults.crop_defaults,
    };

    let name_parts = match raw.get("name_parts") {
        Some(parts) => {
            let flag = |key| field::<bool>(parts, key).unwrap_or(true);
            NameParts {
                use_id: flag("use_id"),
                use_first: flag("use_first"),
                use_last: flag("use_last"),
            }
        }
        None => defaults.name_parts,
    };

    AppConfig {
        last_out_dir: field::<String>(raw, "last_out_dir")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.last_out_dir),
        scale_factor,
        output_format: field(raw, "output_format").unwrap_or(defaults.output_format),
        jpeg_quality,
        crop_defaults,
        name_parts,
    }
}

/// Load settings from `path`, falling back to defaults on any problem.
pub fn load_config(path: &Path) -> AppConfig {
    match load_raw_config(path) {
        Ok(Some(raw)) => resolve_config(&raw),
        Ok(None) => AppConfig::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "using default settings");
            AppConfig::default()
        }
    }
}

/// Write settings to `path`, creating the parent directory.
pub fn write_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}

/// Best-effort save; failures are logged and swallowed.
pub fn save_config(config: &AppConfig, path: &Path) {
    match write_config(config, path) {
        Ok(()) => tracing::debug!(path = %path.display(), "saved settings"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not save settings"),
    }
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# ortho-baa settings
# ==================
# All settings are optional. Values shown below are the defaults.
# A missing or invalid value falls back to its default; unknown keys are
# ignored. The tool rewrites last_out_dir and output_format after every
# successful export.

# Where composed pages are written when --out-dir is not given.
# last_out_dir = "~/Documents/IPA Fixer/Before and After"

# Shrink applied after fitting each photo into its half of the page,
# leaving a visible white frame. Must be greater than 0 and at most 1.
scale_factor = 0.85

# "PDF" (US Letter landscape) or "JPEG" (3300x2550 px sheet).
output_format = "PDF"

# JPEG encoding quality (1 = worst, 100 = best). Ignored for PDF.
jpeg_quality = 92

# ---------------------------------------------------------------------------
# Two-stage crop (used when --crop-before / --crop-after is given)
# ---------------------------------------------------------------------------
[crop_defaults]
# Keep the top N rows of the photo...
top = 3250
# ...then keep the bottom N rows of what remains.
bottom = 3020

# ---------------------------------------------------------------------------
# Parts of the patient identity used in suggested file names
# ---------------------------------------------------------------------------
[name_parts]
use_id = true
use_first = true
use_last = true
"##
}
