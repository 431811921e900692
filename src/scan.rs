//! Folder scanning: guess before/after pairs from filenames.
//!
//! Only the immediate files of the folder are considered (no recursion),
//! filtered by extension and sorted case-insensitively. Pairing then runs in
//! two passes:
//!
//! 1. **Suffix pass.** Stems ending in ` before`, `-before`, `_before` (or the
//!    `after` forms, any case) are grouped by the prefix in front of the
//!    suffix. A prefix with both a before and an after file becomes a pair.
//!    If a prefix has several before (or after) files, the last one in sort
//!    order wins.
//! 2. **Positional pass.** Everything the suffix pass did not consume is
//!    paired two at a time in sorted order: even index = before, odd = after.
//!    A trailing odd file is dropped.
//!
//! ```text
//! Smith-Before.jpg ┐
//! Smith-After.jpg  ┴─ pass 1 → ("Smith-Before.jpg", "Smith-After.jpg", "Smith")
//! a.png ┐
//! b.png ┴──────────── pass 2 → ("a.png", "b.png", "a")
//! c.png ───────────── dropped
//! ```
//!
//! An empty folder, or one where nothing pairs, is not an error.
//!
//! [`preview_pairs`] adds the pixel size of each file (read from the header
//! only) so a listing shows up front which pairs a batch would skip.

use crate::imaging::{Dimensions, ImageBackend};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read folder {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A before/after file pair with the base name used for its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pair {
    pub before: PathBuf,
    pub after: PathBuf,
    pub base_name: String,
}

/// A pair plus the size of each file; `None` means it could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairPreview {
    #[serde(flatten)]
    pub pair: Pair,
    pub before_size: Option<Dimensions>,
    pub after_size: Option<Dimensions>,
}

/// Base name used when the prefix in front of a suffix is empty
/// (`before.jpg` + `after.jpg`).
const EMPTY_PREFIX_NAME: &str = "Pair";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Before,
    After,
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '-' || c == '_'
}

/// Split a stem ending in a before/after suffix into `(prefix, role)`.
///
/// The whole separator run in front of the suffix is dropped, so
/// `Smith - before` and `Smith_after` share the prefix `Smith`.
fn split_role(stem: &str) -> Option<(&str, Role)> {
    let lower = stem.to_lowercase();
    // Lowercasing can change byte lengths for some scripts; only trust the
    // split when it didn't.
    if lower.len() != stem.len() {
        return None;
    }
    for (word, role) in [("before", Role::Before), ("after", Role::After)] {
        for sep in [' ', '-', '_'] {
            let suffix = format!("{sep}{word}");
            if lower.ends_with(&suffix) {
                let prefix = &stem[..stem.len() - suffix.len()];
                return Some((prefix.trim_end_matches(is_separator), role));
            }
        }
    }
    None
}

fn display_base(prefix: &str) -> String {
    let trimmed = prefix.trim();
    if trimmed.is_empty() {
        EMPTY_PREFIX_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Image files directly inside `folder`, sorted by lowercased file name.
fn list_images(folder: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, ScanError> {
    let io_err = |source| ScanError::Io {
        path: folder.to_path_buf(),
        source,
    };
    let mut files: Vec<PathBuf> = fs::read_dir(folder)
        .map_err(io_err)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        })
        .collect();
    files.sort_by_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    Ok(files)
}

/// Per-prefix slot filled by the suffix pass.
struct Group {
    key: String,
    base_name: String,
    before: Option<usize>,
    after: Option<usize>,
}

/// Guess before/after pairs among the images in `folder`.
///
/// `extensions` are matched case-insensitively without the leading dot;
/// pass [`crate::imaging::ImageBackend::supported_extensions`] to restrict
/// to what can actually be decoded.
pub fn guess_pairs(folder: &Path, extensions: &[&str]) -> Result<Vec<Pair>, ScanError> {
    let files = list_images(folder, extensions)?;

    // Insertion-ordered so pairs come out in sorted-prefix order
    let mut groups: Vec<Group> = Vec::new();
    for (idx, path) in files.iter().enumerate() {
        let stem = stem_of(path);
        let Some((prefix, role)) = split_role(&stem) else {
            continue;
        };
        let key = prefix.to_lowercase();
        let pos = match groups.iter().position(|g| g.key == key) {
            Some(pos) => pos,
            None => {
                groups.push(Group {
                    key,
                    base_name: display_base(prefix),
                    before: None,
                    after: None,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[pos];
        match role {
            Role::Before => group.before = Some(idx),
            Role::After => group.after = Some(idx),
        }
    }

    let mut used = vec![false; files.len()];
    let mut pairs = Vec::new();
    for group in groups {
        if let (Some(b), Some(a)) = (group.before, group.after) {
            used[b] = true;
            used[a] = true;
            pairs.push(Pair {
                before: files[b].clone(),
                after: files[a].clone(),
                base_name: group.base_name,
            });
        }
    }

    let remaining: Vec<&PathBuf> = files
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(p, _)| p)
        .collect();
    for chunk in remaining.chunks_exact(2) {
        pairs.push(Pair {
            before: chunk[0].clone(),
            after: chunk[1].clone(),
            base_name: stem_of(chunk[0]),
        });
    }

    tracing::debug!(
        folder = %folder.display(),
        files = files.len(),
        pairs = pairs.len(),
        "guessed pairs"
    );
    Ok(pairs)
}

/// Identify both files of every pair without decoding pixels.
pub fn preview_pairs(backend: &impl ImageBackend, pairs: Vec<Pair>) -> Vec<PairPreview> {
    let size = |path: &Path| match backend.identify(path) {
        Ok(dims) => Some(dims),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot identify");
            None
        }
    };
    pairs
        .into_iter()
        .map(|pair| PairPreview {
            before_size: size(&pair.before),
            after_size: size(&pair.after),
            pair,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    const EXTS: &[&str] = &["jpg", "jpeg", "png"];

    fn guess(names: &[&str]) -> Vec<(String, String, String)> {
        let tmp = empty_files(names);
        pair_names(&guess_pairs(tmp.path(), EXTS).unwrap())
    }

    #[test]
    fn suffix_pairs_come_before_positional_pairs() {
        assert_eq!(
            guess(&["Smith-Before.jpg", "Smith-After.jpg", "a.png", "b.png"]),
            triples(&[
                ("Smith-Before.jpg", "Smith-After.jpg", "Smith"),
                ("a.png", "b.png", "a"),
            ])
        );
    }

    #[test]
    fn all_suffix_separators_recognized() {
        assert_eq!(
            guess(&[
                "Ann before.jpg",
                "Ann AFTER.jpg",
                "bob_before.png",
                "bob_after.png",
                "Cy-before.jpg",
                "Cy-after.jpg",
            ]),
            triples(&[
                ("Ann before.jpg", "Ann AFTER.jpg", "Ann"),
                ("bob_before.png", "bob_after.png", "bob"),
                ("Cy-before.jpg", "Cy-after.jpg", "Cy"),
            ])
        );
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        assert_eq!(
            guess(&["SMITH-before.jpg", "smith-after.jpg"]),
            // Base name is spelled as in the first file in sort order
            triples(&[("SMITH-before.jpg", "smith-after.jpg", "smith")])
        );
    }

    #[test]
    fn empty_prefix_is_named_pair() {
        assert_eq!(
            guess(&["_before.jpg", "_after.jpg"]),
            triples(&[("_before.jpg", "_after.jpg", "Pair")])
        );
    }

    #[test]
    fn separator_run_before_suffix_is_ignored() {
        assert_eq!(
            guess(&["Smith - before.jpg", "Smith_after.jpg", "zz.jpg"]),
            triples(&[("Smith - before.jpg", "Smith_after.jpg", "Smith")])
        );
        assert_eq!(
            guess(&["Jones__before.jpg", "Jones_after.jpg"]),
            triples(&[("Jones__before.jpg", "Jones_after.jpg", "Jones")])
        );
    }

    #[test]
    fn leading_separator_stays_in_base_name() {
        assert_eq!(
            guess(&["_x_before.jpg", "_x_after.jpg"]),
            triples(&[("_x_before.jpg", "_x_after.jpg", "_x")])
        );
    }

    #[test]
    fn lone_suffix_file_falls_through_to_positional() {
        assert_eq!(
            guess(&["Jones-before.jpg", "x.jpg"]),
            triples(&[("Jones-before.jpg", "x.jpg", "Jones-before")])
        );
    }

    #[test]
    fn later_duplicate_role_wins() {
        // Sorted: a-after, a-before, a_before. Both befores key to "a";
        // the later one is kept and the earlier is left for pass 2.
        assert_eq!(
            guess(&["a-before.jpg", "a_before.jpg", "a-after.jpg", "z.jpg"]),
            triples(&[
                ("a_before.jpg", "a-after.jpg", "a"),
                ("a-before.jpg", "z.jpg", "a-before"),
            ])
        );
    }

    #[test]
    fn odd_leftover_is_dropped() {
        assert_eq!(
            guess(&["c.png", "a.png", "b.png"]),
            triples(&[("a.png", "b.png", "a")])
        );
    }

    #[test]
    fn sorting_ignores_case() {
        assert_eq!(
            guess(&["B.jpg", "a.jpg"]),
            triples(&[("a.jpg", "B.jpg", "a")])
        );
    }

    #[test]
    fn word_without_separator_is_not_a_suffix() {
        // "preafter" has no separator before "after"
        assert_eq!(
            guess(&["preafter.jpg", "xbefore.jpg"]),
            triples(&[("preafter.jpg", "xbefore.jpg", "preafter")])
        );
    }

    #[test]
    fn filters_by_extension_and_skips_dirs() {
        let tmp = empty_files(&["a.jpg", "notes.txt", "b.JPG", "c.heic"]);
        std::fs::create_dir(tmp.path().join("sub.jpg")).unwrap();
        let pairs = guess_pairs(tmp.path(), EXTS).unwrap();
        assert_eq!(pair_names(&pairs), triples(&[("a.jpg", "b.JPG", "a")]));
    }

    #[test]
    fn empty_folder_yields_no_pairs() {
        let tmp = empty_files(&[]);
        assert!(guess_pairs(tmp.path(), EXTS).unwrap().is_empty());
    }

    #[test]
    fn missing_folder_is_an_error() {
        let tmp = empty_files(&[]);
        let result = guess_pairs(&tmp.path().join("nope"), EXTS);
        assert!(matches!(result, Err(ScanError::Io { .. })));
    }

    #[test]
    fn preview_reports_sizes_and_unreadable_files() {
        use crate::imaging::backend::tests::MockBackend;

        let backend = MockBackend::new().with_image("a.jpg", 40, 30);
        let pairs = vec![Pair {
            before: PathBuf::from("a.jpg"),
            after: PathBuf::from("b.jpg"),
            base_name: "a".into(),
        }];
        let previews = preview_pairs(&backend, pairs);

        assert_eq!(previews.len(), 1);
        assert_eq!(
            previews[0].before_size,
            Some(Dimensions { width: 40, height: 30 })
        );
        assert_eq!(previews[0].after_size, None);
        // Sizes come from headers, not full decodes
        assert!(backend.decoded_names().is_empty());
    }

    #[test]
    fn preview_serializes_flat() {
        let preview = PairPreview {
            pair: Pair {
                before: PathBuf::from("a.jpg"),
                after: PathBuf::from("b.jpg"),
                base_name: "a".into(),
            },
            before_size: Some(Dimensions { width: 4, height: 3 }),
            after_size: None,
        };
        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["base_name"], "a");
        assert_eq!(json["before_size"]["width"], 4);
        assert!(json["after_size"].is_null());
    }

    #[test]
    fn pair_serializes_for_listing() {
        let pair = Pair {
            before: PathBuf::from("a.jpg"),
            after: PathBuf::from("b.jpg"),
            base_name: "a".into(),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["before"], "a.jpg");
        assert_eq!(json["base_name"], "a");
    }
}
