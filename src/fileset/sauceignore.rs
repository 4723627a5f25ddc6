//! `.sauceignore` support.
//!
//! A `.sauceignore` file uses gitignore syntax to keep files out of the
//! bundle uploaded to Sauce Labs. Spec files it ignores are also removed
//! before sharding, otherwise a shard could reference a file that never
//! reaches the cloud.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};

/// Lines starting with this prefix are comments.
const COMMENT_PREFIX: &str = "#";

/// A compiled set of `.sauceignore` patterns.
///
/// An empty matcher ignores nothing.
#[derive(Debug, Clone, Default)]
pub struct Sauceignore {
    matcher: Option<Gitignore>,
}

impl Sauceignore {
    /// A matcher that ignores nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Loads the patterns in `file`, interpreting them relative to `root`.
    ///
    /// A missing file is not an error. If the file cannot be read or parsed,
    /// a warning is logged and no filter is applied.
    pub fn load(root: &Path, file: &Path) -> Self {
        let content = match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = %file.display(), "No .sauceignore file found");
                return Self::none();
            }
            Err(e) => {
                warn!(
                    file = %file.display(),
                    "An error occurred when reading the sauceignore file. No filter will be applied: {}",
                    e
                );
                return Self::none();
            }
        };

        let lines: Vec<&str> = content.lines().collect();
        Self::from_lines(root, &lines)
    }

    /// Builds a matcher from raw `.sauceignore` lines.
    pub fn from_lines(root: &Path, lines: &[&str]) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        for line in lines {
            if line.starts_with(COMMENT_PREFIX) || line.trim().is_empty() {
                continue;
            }
            if let Err(e) = builder.add_line(None, line) {
                warn!(
                    pattern = %line,
                    "Invalid sauceignore pattern. No filter will be applied: {}",
                    e
                );
                return Self::none();
            }
        }

        match builder.build() {
            Ok(matcher) if !matcher.is_empty() => Self {
                matcher: Some(matcher),
            },
            Ok(_) => Self::none(),
            Err(e) => {
                warn!("Failed to compile sauceignore patterns. No filter will be applied: {}", e);
                Self::none()
            }
        }
    }

    /// Returns true if the `/`-separated relative path is ignored, either
    /// directly or through one of its parent directories.
    pub fn is_ignored(&self, rel: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher
                .matched_path_or_any_parents(Path::new(rel), false)
                .is_ignore(),
            None => false,
        }
    }

    /// Removes ignored paths from `files`, keeping order.
    pub fn filter(&self, files: Vec<String>) -> Vec<String> {
        if self.matcher.is_none() {
            return files;
        }
        files
            .into_iter()
            .filter(|f| {
                let ignored = self.is_ignored(f);
                if ignored {
                    debug!(file = %f, "File excluded by sauceignore");
                }
                !ignored
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files() -> Vec<String> {
        [
            "tests/dir1/file1.js",
            "tests/dir2/file1.js",
            "tests/dir2/file2.js",
            "tests/dir3/file3.js",
            "tests/example/node_modules/bin/test.js",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_no_filter() {
        let ignore = Sauceignore::from_lines(Path::new("/project"), &[]);
        assert_eq!(ignore.filter(files()), files());
    }

    #[test]
    fn test_node_modules_excluded() {
        let ignore = Sauceignore::from_lines(Path::new("/project"), &["node_modules"]);
        let filtered = ignore.filter(files());
        assert_eq!(filtered.len(), 4);
        assert!(!filtered.iter().any(|f| f.contains("node_modules")));
    }

    #[test]
    fn test_comments_and_directories() {
        let ignore = Sauceignore::from_lines(
            Path::new("/project"),
            &["# ignore dir2", "tests/dir2/", ""],
        );
        assert_eq!(
            ignore.filter(files()),
            vec![
                "tests/dir1/file1.js",
                "tests/dir3/file3.js",
                "tests/example/node_modules/bin/test.js",
            ]
        );
    }

    #[test]
    fn test_missing_file_ignores_nothing() {
        let dir = TempDir::new().unwrap();
        let ignore = Sauceignore::load(dir.path(), &dir.path().join(".sauceignore"));
        assert!(!ignore.is_ignored("tests/dir1/file1.js"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".sauceignore");
        std::fs::write(&path, "# comment\n*.md\ntests/dir3\n").unwrap();

        let ignore = Sauceignore::load(dir.path(), &path);
        assert!(ignore.is_ignored("README.md"));
        assert!(ignore.is_ignored("tests/dir3/file3.js"));
        assert!(!ignore.is_ignored("tests/dir1/file1.js"));
    }
}
