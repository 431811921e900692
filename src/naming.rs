//! Patient identity parsing and output-name suggestion.
//!
//! Clinic exports are named `ID_first_last[_descriptor][ (n)].ext`:
//!
//! - `045_john_doe_preop.jpg` → id `045`, first `John`, last `Doe`
//! - `12 sean o'brien.png` → id `12`, first `Sean`, last `O'Brien`
//! - `7-ann-smith-jones post (1).heic` → id `7`, first `Ann`, last `Smith-Jones`
//! - `IMG_0042.jpg` → no identity
//!
//! Separators are any run of `_`, `-`, or whitespace. The last name may carry
//! internal hyphens and apostrophes; a hyphen directly followed by a letter
//! is read as part of the last name, not as a separator.
//!
//! ## Suggested names
//!
//! The enabled parts (see [`NameParts`]) are joined with `_` and suffixed
//! with `_BeforeAndAfter`. When both images parse, the *before* identity
//! wins even if the two disagree; no mismatch is reported.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Suffix appended to every identity-based name.
pub const PAIR_SUFFIX: &str = "_BeforeAndAfter";

/// Name used when neither file carries an identity.
pub const UNNAMED_PAIR: &str = "Before_vs_After";

/// `{id, first, last}` extracted from a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIdentity {
    /// Digits exactly as written, leading zeros kept.
    pub id: String,
    pub first: String,
    pub last: String,
}

/// Which identity parts go into a suggested name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameParts {
    pub use_id: bool,
    pub use_first: bool,
    pub use_last: bool,
}

impl Default for NameParts {
    fn default() -> Self {
        Self {
            use_id: true,
            use_first: true,
            use_last: true,
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '_' || c == '-' || c.is_whitespace()
}

/// Cursor over the characters of a filename stem.
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        taken
    }

    /// At least one separator character.
    fn separator(&mut self) -> Option<()> {
        (!self.take_while(is_separator).is_empty()).then_some(())
    }

    fn word(&mut self) -> Option<&'a str> {
        let w = self.take_while(char::is_alphabetic);
        (!w.is_empty()).then_some(w)
    }

    /// Letters with internal `-`/`'` joiners, each followed by a letter.
    fn compound_word(&mut self) -> Option<&'a str> {
        let start = self.rest;
        self.word()?;
        loop {
            let mut chars = self.rest.chars();
            match (chars.next(), chars.next()) {
                (Some(j @ ('-' | '\'')), Some(c)) if c.is_alphabetic() => {
                    self.rest = &self.rest[j.len_utf8()..];
                    self.word();
                }
                _ => break,
            }
        }
        Some(&start[..start.len() - self.rest.len()])
    }
}

/// Split off a trailing `(n)` copy marker and any whitespace before it.
fn strip_copy_suffix(stem: &str) -> &str {
    let Some(inner) = stem.trim_end().strip_suffix(')') else {
        return stem;
    };
    match inner.rfind('(') {
        Some(open)
            if open + 1 < inner.len()
                && inner[open + 1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            inner[..open].trim_end()
        }
        _ => stem,
    }
}

/// Parse `ID_first_last[_descriptor][ (n)].ext`; `None` when it doesn't fit.
///
/// Only the final path component is examined. An extension is required.
pub fn parse_patient_from_filename(filename: &str) -> Option<ParsedIdentity> {
    let name = Path::new(filename).file_name()?.to_str()?;
    let (stem, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let mut scan = Scanner {
        rest: strip_copy_suffix(stem),
    };
    let id = scan.take_while(|c| c.is_ascii_digit());
    if id.is_empty() {
        return None;
    }
    scan.separator()?;
    let first = scan.word()?;
    scan.separator()?;
    let last = scan.compound_word()?;
    // Anything left must be a separator-led descriptor
    if !scan.rest.is_empty() && !scan.rest.starts_with(is_separator) {
        return None;
    }

    Some(ParsedIdentity {
        id: id.to_string(),
        first: title_case_name(first),
        last: title_case_name(last),
    })
}

/// Capitalize each alphabetic run independently: `mary-jane` → `Mary-Jane`,
/// `o'BRIEN` → `O'Brien`.
pub fn title_case_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_run_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_run_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_run_start = false;
        } else {
            out.push(c);
            at_run_start = true;
        }
    }
    out
}

/// Join the enabled parts with `_` and append [`PAIR_SUFFIX`].
///
/// With nothing enabled (or every enabled part empty) the first non-empty of
/// id/first/last stands in, then the literal `Patient`.
pub fn compose_basename(identity: &ParsedIdentity, parts: NameParts) -> String {
    let chosen: Vec<&str> = [
        (parts.use_id, identity.id.as_str()),
        (parts.use_first, identity.first.as_str()),
        (parts.use_last, identity.last.as_str()),
    ]
    .into_iter()
    .filter(|(on, value)| *on && !value.is_empty())
    .map(|(_, value)| value)
    .collect();

    let base = if chosen.is_empty() {
        [&identity.id, &identity.first, &identity.last]
            .into_iter()
            .find(|v| !v.is_empty())
            .map(String::as_str)
            .unwrap_or("Patient")
            .to_string()
    } else {
        chosen.join("_")
    };
    format!("{base}{PAIR_SUFFIX}")
}

/// Identity for a pair: the before file's if it parses, else the after file's.
pub fn suggest_identity(before_name: &str, after_name: &str) -> Option<ParsedIdentity> {
    parse_patient_from_filename(before_name).or_else(|| parse_patient_from_filename(after_name))
}

/// Suggested output basename (no extension) for a before/after pair.
pub fn suggest_basename(before_name: &str, after_name: &str, parts: NameParts) -> String {
    match suggest_identity(before_name, after_name) {
        Some(identity) => compose_basename(&identity, parts),
        None => UNNAMED_PAIR.to_string(),
    }
}

/// `{before_stem}_vs_{after_stem}`, the name of last resort when a caller
/// wants something more specific than [`UNNAMED_PAIR`].
pub fn fallback_stem_name(before: &Path, after: &Path) -> String {
    let stem = |p: &Path, default: &str| {
        p.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| default.to_string())
    };
    format!("{}_vs_{}", stem(before, "Before"), stem(after, "After"))
}
