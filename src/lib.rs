//! # ortho-baa
//!
//! Before/after comparison pages for clinical photography. Two photos go in,
//! one printable page comes out: a US Letter landscape PDF or a 300dpi JPEG
//! sheet with the "before" on the left and the "after" on the right.
//!
//! # Pipeline
//!
//! ```text
//! load ─→ crop (optional) ─→ layout ─→ export ─→ <name>.pdf | <name>.jpg
//!   │                                               ▲
//!   └─ filenames ─→ patient identity ─→ name ───────┘
//! ```
//!
//! A single pair goes through [`compose`]. A whole folder goes through
//! [`scan`] (guess the pairs) and then [`batch`] (export each one, skipping
//! failures).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Decoding behind a backend trait, two-stage crop, fit math |
//! | [`layout`] | Side-by-side placement on a canvas, float and pixel flavors |
//! | [`export`] | PDF (`lopdf`) and JPEG (`jpeg-encoder`) writers, extension forcing |
//! | [`naming`] | `ID_first_last` filename parsing and output-name suggestion |
//! | [`scan`] | Before/after pairing within a folder |
//! | [`compose`] | One export: load, crop, name, write |
//! | [`batch`] | Sequential export of many pairs with progress events |
//! | [`config`] | Persisted settings, lenient TOML loading, best-effort saving |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Never Distort, Never Crop to Fit
//!
//! Each photo is fitted inside its half of the page preserving aspect ratio,
//! then shrunk by a scale factor (0.85 by default) so there is always a white
//! frame. The only cropping is the explicit two-stage vertical crop the user
//! asks for.
//!
//! ## Naming Is Best Effort
//!
//! Clinic exports follow an `ID_first_last_descriptor.ext` habit, but not
//! reliably. When the pattern is there the output is named after the patient;
//! when it is not, a plain fallback is used. A mismatch between the before and
//! after identities is not an error: the before file wins.
//!
//! ## Loading Is Not Failing
//!
//! An unreadable photo is "no image", not an error. The single-pair flow turns
//! that into a precondition error before anything is written; the batch flow
//! reports it and moves on to the next pair.
//!
//! ## Pure-Rust Decoding
//!
//! JPEG, PNG, BMP, TIFF and WebP come from the `image` crate; AVIF from
//! `avif-parse` + `rav1d` behind the `avif` feature. HEIC/HEIF are recognized
//! but reported as unavailable rather than pulling in a system library.

pub mod batch;
pub mod compose;
pub mod config;
pub mod export;
pub mod imaging;
pub mod layout;
pub mod logging;
pub mod naming;
pub mod output;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
