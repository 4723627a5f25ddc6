//! Narrowing spec files with framework filter expressions.
//!
//! Each supported framework has its own filter dialect, and the generated
//! configuration is consumed by that framework, so each dialect follows its
//! tool's documented semantics:
//!
//! | Module | Dialect | Evaluated against |
//! |--------|---------|-------------------|
//! | [`cucumber`] | Cucumber tag expressions (`@a and not @b`) | scenario tags |
//! | [`cypress_grep`] | `@cypress/grep` title and tag expressions | test titles and `tags` |
//! | [`playwright_grep`] | Playwright `--grep` / `--grep-invert` regexes | file paths and test titles |
//!
//! # Failure Modes
//!
//! Filters narrow a file set; they are not a correctness gate. A malformed
//! filter or an unreadable file therefore never aborts a run, but the
//! dialects degrade differently:
//!
//! - Cucumber and cypress expressions that cannot be parsed match nothing.
//! - Playwright patterns that cannot be compiled match everything.
//!
//! The sharder turns an empty filtered set into an error, so the Cucumber
//! case still surfaces to the user, while an invalid Playwright pattern
//! silently runs every file.

pub mod cucumber;
pub mod cypress_grep;
pub mod gherkin;
pub mod playwright_grep;
pub mod tag_expr;

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use serde::Serialize;

/// Read access to spec files by their root-relative path.
pub trait SpecSource {
    /// Reads the full contents of `path`.
    fn read_to_string(&self, path: &str) -> io::Result<String>;
}

/// Reads spec files from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SpecSource for DirSource {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(path))
    }
}

/// In-memory spec files, keyed by relative path.
impl SpecSource for HashMap<String, String> {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        self.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{path}: file does not exist"))
        })
    }
}

/// The outcome of filtering a list of files.
///
/// Every input file ends up in exactly one of the two lists, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
}

impl MatchResult {
    /// Every file matched.
    pub fn all(files: &[String]) -> Self {
        Self {
            matched: files.to_vec(),
            unmatched: Vec::new(),
        }
    }

    /// No file matched.
    pub fn none(files: &[String]) -> Self {
        Self {
            matched: Vec::new(),
            unmatched: files.to_vec(),
        }
    }

    fn push(&mut self, file: &str, matched: bool) {
        if matched {
            self.matched.push(file.to_string());
        } else {
            self.unmatched.push(file.to_string());
        }
    }
}

#[cfg(test)]
pub(crate) fn mem_source(files: &[(&str, &str)]) -> HashMap<String, String> {
    files
        .iter()
        .map(|(path, content)| (path.to_string(), content.to_string()))
        .collect()
}
