//! Local file and directory naming
//!
//! Turns DocuShare titles into names that are valid on common filesystems and
//! unique among their siblings.

use crate::domain::ids::ObjectHandle;
use std::collections::HashSet;

/// Longest name written, in bytes
pub const MAX_NAME_BYTES: usize = 200;

/// Extensions longer than this (dot included) are treated as part of the title
const MAX_EXTENSION_CHARS: usize = 5;

fn is_forbidden(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ';' | '$') || c.is_control()
}

fn replace_forbidden(s: &str) -> String {
    s.chars()
        .map(|c| if is_forbidden(c) { '-' } else { c })
        .collect()
}

/// Sanitizes a title into a single path component
///
/// Falls back to the object handle when nothing usable is left.
pub fn sanitize_name(title: &str, fallback: &ObjectHandle) -> String {
    let replaced = replace_forbidden(title);
    let trimmed = replaced.trim().trim_end_matches('.').trim_end();

    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return fallback.to_string();
    }
    trimmed.to_string()
}

/// Extension of `name` including the dot, ignoring leading dots
///
/// ```
/// use docudump::core::export::naming::extension;
///
/// assert_eq!(extension("report.pdf"), Some(".pdf"));
/// assert_eq!(extension(".profile"), None);
/// assert_eq!(extension("Q1 Report"), None);
/// ```
pub fn extension(name: &str) -> Option<&str> {
    let dot = name.rfind('.')?;
    if name[..dot].chars().all(|c| c == '.') || dot + 1 == name.len() {
        return None;
    }
    Some(&name[dot..])
}

/// [`extension`], unless it is too long to be anything but part of a dotted title
fn plausible_extension(name: &str) -> Option<&str> {
    extension(name).filter(|ext| ext.chars().count() <= MAX_EXTENSION_CHARS)
}

fn split_name(name: &str) -> (&str, &str) {
    match plausible_extension(name) {
        Some(ext) => name.split_at(name.len() - ext.len()),
        None => (name, ""),
    }
}

/// Appends the extension of the original or stored file name when the title
/// lacks a plausible one
pub fn infer_extension(name: &str, original: Option<&str>, stored: Option<&str>) -> String {
    if plausible_extension(name).is_some() {
        return name.to_string();
    }

    let inferred = original
        .and_then(extension)
        .or_else(|| stored.and_then(extension));

    match inferred {
        Some(ext) => format!("{name}{}", replace_forbidden(ext)),
        None => name.to_string(),
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Joins `stem` and `tail`, cutting the stem so the result fits `max` bytes
fn fit(stem: &str, tail: &str, max: usize) -> String {
    let budget = max.saturating_sub(tail.len());
    let stem = &stem[..floor_char_boundary(stem, budget)];
    format!("{}{tail}", stem.trim_end())
}

/// Whether a name is for a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    File,
    Directory,
}

fn parts(name: &str, kind: NameKind) -> (&str, &str) {
    match kind {
        NameKind::File => split_name(name),
        NameKind::Directory => (name, ""),
    }
}

/// Truncates a name to [`MAX_NAME_BYTES`], keeping a file's extension
pub fn truncate_name(name: &str, kind: NameKind) -> String {
    if name.len() <= MAX_NAME_BYTES {
        return name.to_string();
    }
    let (stem, ext) = parts(name, kind);
    fit(stem, ext, MAX_NAME_BYTES)
}

/// Names already used in one directory
///
/// Folders, documents and links share the namespace. The first claimant keeps
/// its name; later ones get ` (2)`, ` (3)`, ... before the extension.
#[derive(Debug, Default)]
pub struct SiblingNames {
    taken: HashSet<String>,
}

impl SiblingNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `name`, or the first free numbered variant of it
    pub fn claim(&mut self, name: &str, kind: NameKind) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }

        let (stem, ext) = parts(name, kind);
        let mut n = 2usize;
        loop {
            let candidate = fit(stem, &format!(" ({n}){ext}"), MAX_NAME_BYTES);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
