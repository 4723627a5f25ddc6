//! Resolution of spec-file patterns against a project directory.
//!
//! Suites select their spec files with shell-style glob patterns such as
//! `cypress/e2e/**/*.cy.js`. This module expands those patterns into a
//! concrete, deduplicated and sorted list of `/`-separated paths relative to
//! the project root.
//!
//! # Pattern Syntax
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `*` | any sequence of characters except `/` |
//! | `?` | any single character except `/` |
//! | `[abc]`, `[!a-z]` | character classes |
//! | `{a,b}` | alternation |
//! | `**` | zero or more directories |
//!
//! A malformed pattern is skipped with a warning; resolution continues with
//! the remaining patterns. Whether an empty result is acceptable is decided
//! by the caller.
//!
//! # Example
//!
//! ```no_run
//! use saucectl::fileset::resolve;
//! use std::path::Path;
//!
//! let files = resolve(
//!     Path::new("."),
//!     &["tests/**/*.js".to_string()],
//!     &["tests/**/*.skip.js".to_string()],
//! )?;
//! # Ok::<(), saucectl::fileset::FilesetError>(())
//! ```

pub mod sauceignore;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub use sauceignore::Sauceignore;

/// Errors that abort file resolution.
#[derive(Debug, thiserror::Error)]
pub enum FilesetError {
    /// The root directory could not be walked.
    #[error("Failed to walk '{}': {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A pattern that could not be compiled and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("test file pattern '{pattern}' is not supported: {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

/// Compiles `patterns` into a single glob set.
///
/// Malformed patterns are logged and returned alongside the set of the
/// patterns that did compile.
pub fn glob_set(patterns: &[String]) -> (GlobSet, Vec<PatternError>) {
    let mut builder = GlobSetBuilder::new();
    let mut skipped = Vec::new();

    for pattern in patterns {
        let normalized = normalize_pattern(pattern);
        match GlobBuilder::new(normalized).literal_separator(true).build() {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => {
                let err = PatternError {
                    pattern: pattern.clone(),
                    message: e.kind().to_string(),
                };
                warn!(
                    pattern = %pattern,
                    "Skipping over malformed pattern. Some of your test files will be missing: {}",
                    err
                );
                skipped.push(err);
            }
        }
    }

    let set = builder.build().unwrap_or_else(|e| {
        warn!("Failed to compile test file patterns: {}", e);
        GlobSet::empty()
    });

    (set, skipped)
}

/// Returns every file under `root` matching at least one of `patterns`.
///
/// Paths are relative to `root`, `/`-separated, deduplicated and sorted
/// lexicographically.
pub fn find_files(root: &Path, patterns: &[String]) -> Result<Vec<String>, FilesetError> {
    let (set, _) = glob_set(patterns);
    if set.is_empty() {
        return Ok(Vec::new());
    }

    let root = if root.as_os_str().is_empty() {
        Path::new(".")
    } else {
        root
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| FilesetError::Walk {
            root: root.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel = to_slash(rel);

        if set.is_match(&rel) {
            debug!(file = %rel, "Matched test file");
            files.push(rel);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Removes every entry of `excluded` from `files`, keeping the order of `files`.
pub fn exclude(files: Vec<String>, excluded: &[String]) -> Vec<String> {
    if excluded.is_empty() {
        return files;
    }
    let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();
    files
        .into_iter()
        .filter(|f| !excluded.contains(f.as_str()))
        .collect()
}

/// Resolves `include` patterns under `root` and subtracts the files matched
/// by `exclude`.
///
/// The result is sorted and contains no duplicates, so identical inputs
/// always produce identical output.
pub fn resolve(
    root: &Path,
    include: &[String],
    exclude_patterns: &[String],
) -> Result<Vec<String>, FilesetError> {
    let files = find_files(root, include)?;
    if exclude_patterns.is_empty() || files.is_empty() {
        return Ok(files);
    }

    let excluded = find_files(root, exclude_patterns)?;
    Ok(exclude(files, &excluded))
}

fn normalize_pattern(pattern: &str) -> &str {
    let mut p = pattern.trim();
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    p
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
