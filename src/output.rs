//! CLI output formatting.
//!
//! Everything the user reads on stdout goes through here. Diagnostics go to
//! stderr via `tracing` instead.
//!
//! # Output Format
//!
//! ## Pairs
//!
//! ```text
//! 001 Smith
//!     Before: Smith-Before.jpg (4000×3000)
//!     After:  Smith-After.jpg (4000×3000)
//! 002 a
//!     Before: a.png (640×480)
//!     After:  b.png (unreadable)
//!
//! 2 pairs in photos/
//! ```
//!
//! ## Batch
//!
//! ```text
//! Exporting 2 pairs
//! [ 50%] 001 → 045_John_Doe_BeforeAndAfter.pdf
//! [100%] 002 skipped: cannot load photos/c.jpg
//!
//! Wrote 1 file to out/, skipped 1
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::config::AppConfig;
use crate::imaging::{Capabilities, Dimensions};
use crate::scan::PairPreview;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Path relative to `root` when possible, for shorter lines.
fn display_rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Pairs
// ============================================================================

fn format_size(size: Option<Dimensions>) -> String {
    match size {
        Some(d) => format!("({}×{})", d.width, d.height),
        None => "(unreadable)".to_string(),
    }
}

pub fn format_pairs(pairs: &[PairPreview], folder: &Path) -> Vec<String> {
    if pairs.is_empty() {
        return vec![format!("No image pairs found in {}", folder.display())];
    }
    let mut lines = Vec::new();
    for (i, preview) in pairs.iter().enumerate() {
        let pair = &preview.pair;
        lines.push(format!("{} {}", format_index(i + 1), pair.base_name));
        lines.push(format!(
            "{}Before: {} {}",
            indent(1),
            display_rel(&pair.before, folder),
            format_size(preview.before_size)
        ));
        lines.push(format!(
            "{}After:  {} {}",
            indent(1),
            display_rel(&pair.after, folder),
            format_size(preview.after_size)
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "{} in {}",
        plural(pairs.len(), "pair", "pairs"),
        folder.display()
    ));
    lines
}

pub fn print_pairs(pairs: &[PairPreview], folder: &Path) {
    for line in format_pairs(pairs, folder) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

pub fn format_batch_event(event: &BatchEvent, out_dir: &Path) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            vec![format!("Exporting {}", plural(*total, "pair", "pairs"))]
        }
        BatchEvent::PairWritten { index, path, .. } => vec![format!(
            "[{:>3}%] {} → {}",
            event.percent(),
            format_index(*index),
            display_rel(path, out_dir)
        )],
        BatchEvent::PairSkipped { index, reason, .. } => vec![format!(
            "[{:>3}%] {} skipped: {}",
            event.percent(),
            format_index(*index),
            reason
        )],
    }
}

pub fn print_batch_event(event: &BatchEvent, out_dir: &Path) {
    for line in format_batch_event(event, out_dir) {
        println!("{}", line);
    }
}

pub fn format_batch_summary(summary: &BatchSummary, out_dir: &Path) -> Vec<String> {
    let mut line = format!(
        "Wrote {} to {}",
        plural(summary.written.len(), "file", "files"),
        out_dir.display()
    );
    if summary.skipped > 0 {
        line.push_str(&format!(", skipped {}", summary.skipped));
    }
    vec![String::new(), line]
}

pub fn print_batch_summary(summary: &BatchSummary, out_dir: &Path) {
    for line in format_batch_summary(summary, out_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Single export
// ============================================================================

pub fn format_written(path: &Path) -> Vec<String> {
    vec![format!("Saved {}", path.display())]
}

pub fn print_written(path: &Path) {
    for line in format_written(path) {
        println!("{}", line);
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Effective settings plus where they came from and what can be decoded.
pub fn format_config(config: &AppConfig, path: Option<&Path>, caps: Capabilities) -> Vec<String> {
    let on_off = |b: bool| if b { "on" } else { "off" };
    let mut lines = vec![
        match path {
            Some(p) => format!("Settings ({})", p.display()),
            None => "Settings (not persisted)".to_string(),
        },
        format!("{}Output folder: {}", indent(1), config.last_out_dir.display()),
        format!("{}Format: {}", indent(1), config.output_format),
        format!("{}Scale factor: {}", indent(1), config.scale_factor),
        format!("{}JPEG quality: {}", indent(1), config.jpeg_quality),
        format!(
            "{}Crop: top {} then bottom {}",
            indent(1),
            config.crop_defaults.top,
            config.crop_defaults.bottom
        ),
        format!(
            "{}Name parts: id {}, first {}, last {}",
            indent(1),
            on_off(config.name_parts.use_id),
            on_off(config.name_parts.use_first),
            on_off(config.name_parts.use_last)
        ),
        String::new(),
        "Input formats".to_string(),
        format!("{}Supported: {}", indent(1), caps.extensions().join(" ")),
    ];
    let unavailable = caps.unavailable();
    if !unavailable.is_empty() {
        lines.push(format!("{}Unavailable: {}", indent(1), unavailable.join(" ")));
    }
    lines
}

pub fn print_config(config: &AppConfig, path: Option<&Path>, caps: Capabilities) {
    for line in format_config(config, path, caps) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Pair;
    use std::path::PathBuf;

    const SIZE: Option<Dimensions> = Some(Dimensions {
        width: 40,
        height: 30,
    });

    fn pair(before: &str, after: &str, base: &str) -> PairPreview {
        PairPreview {
            pair: Pair {
                before: PathBuf::from(before),
                after: PathBuf::from(after),
                base_name: base.to_string(),
            },
            before_size: SIZE,
            after_size: SIZE,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn pairs_listing_uses_relative_paths() {
        let pairs = vec![
            pair("/p/Smith-Before.jpg", "/p/Smith-After.jpg", "Smith"),
            pair("/p/a.png", "/p/b.png", "a"),
        ];
        let lines = format_pairs(&pairs, Path::new("/p"));
        assert_eq!(
            lines,
            vec![
                "001 Smith",
                "    Before: Smith-Before.jpg (40×30)",
                "    After:  Smith-After.jpg (40×30)",
                "002 a",
                "    Before: a.png (40×30)",
                "    After:  b.png (40×30)",
                "",
                "2 pairs in /p",
            ]
        );
    }

    #[test]
    fn empty_pairs_listing() {
        assert_eq!(
            format_pairs(&[], Path::new("/p")),
            vec!["No image pairs found in /p"]
        );
    }

    #[test]
    fn unreadable_file_is_flagged_in_listing() {
        let mut preview = pair("/p/a.png", "/p/b.png", "a");
        preview.after_size = None;
        let lines = format_pairs(&[preview], Path::new("/p"));
        assert_eq!(lines[1], "    Before: a.png (40×30)");
        assert_eq!(lines[2], "    After:  b.png (unreadable)");
    }

    #[test]
    fn single_pair_is_singular() {
        let lines = format_pairs(&[pair("/p/a.png", "/p/b.png", "a")], Path::new("/p"));
        assert_eq!(lines.last().unwrap(), "1 pair in /p");
    }

    #[test]
    fn batch_events_show_percent_and_name() {
        let out = Path::new("/out");
        assert_eq!(
            format_batch_event(&BatchEvent::Started { total: 2 }, out),
            vec!["Exporting 2 pairs"]
        );
        assert_eq!(
            format_batch_event(
                &BatchEvent::PairWritten {
                    index: 1,
                    total: 2,
                    path: PathBuf::from("/out/x_BeforeAndAfter.pdf"),
                },
                out
            ),
            vec!["[ 50%] 001 → x_BeforeAndAfter.pdf"]
        );
        assert_eq!(
            format_batch_event(
                &BatchEvent::PairSkipped {
                    index: 2,
                    total: 2,
                    before: PathBuf::from("c.jpg"),
                    after: PathBuf::from("d.jpg"),
                    reason: "cannot load c.jpg".into(),
                },
                out
            ),
            vec!["[100%] 002 skipped: cannot load c.jpg"]
        );
    }

    #[test]
    fn batch_summary_mentions_skips_only_when_present() {
        let out = Path::new("/out");
        let clean = BatchSummary {
            written: vec![PathBuf::from("/out/a.pdf")],
            skipped: 0,
        };
        assert_eq!(format_batch_summary(&clean, out)[1], "Wrote 1 file to /out");

        let partial = BatchSummary {
            written: vec![PathBuf::from("/out/a.pdf"), PathBuf::from("/out/b.pdf")],
            skipped: 3,
        };
        assert_eq!(
            format_batch_summary(&partial, out)[1],
            "Wrote 2 files to /out, skipped 3"
        );
    }

    #[test]
    fn config_view_lists_settings_and_formats() {
        let caps = Capabilities {
            avif: false,
            heif: false,
        };
        let lines = format_config(&AppConfig::default(), Some(Path::new("/c/config.toml")), caps);
        assert_eq!(lines[0], "Settings (/c/config.toml)");
        assert!(lines.contains(&"    Format: PDF".to_string()));
        assert!(lines.contains(&"    Crop: top 3250 then bottom 3020".to_string()));
        assert!(lines.contains(&"    Name parts: id on, first on, last on".to_string()));
        let unavailable = lines.last().unwrap();
        assert!(unavailable.starts_with("    Unavailable:"));
        assert!(unavailable.contains("heic"));
        assert!(unavailable.contains("avif"));
    }
}
