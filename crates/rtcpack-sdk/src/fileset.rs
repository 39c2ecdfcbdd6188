//! File collection and copying for package assembly.
//!
//! The collector walks a directory tree (following symbolic links) and
//! returns every file whose name satisfies at least one [`Matcher`], as a
//! path relative to the search root. The copier replays such a list into a
//! destination tree, tolerating individually unreadable files.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::types::PackError;

/// Selects files by name during a tree walk.
///
/// Either an exact suffix (`.o`, `LICENSE`) or a regular expression tested
/// against the file name (`.*\.dll.*`).
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Matches file names ending in the literal suffix.
    Suffix(String),
    /// Matches file names against a compiled pattern.
    Pattern(Regex),
}

impl Matcher {
    /// Suffix matcher from a literal.
    pub fn suffix(suffix: &str) -> Matcher {
        Matcher::Suffix(suffix.to_string())
    }

    /// Pattern matcher from a regular expression source.
    pub fn pattern(pattern: &str) -> Result<Matcher, PackError> {
        let regex = Regex::new(pattern)
            .map_err(|e| PackError::Config(format!("invalid file pattern '{pattern}': {e}")))?;
        Ok(Matcher::Pattern(regex))
    }

    fn matches(&self, file_name: &str) -> bool {
        match self {
            Matcher::Suffix(suffix) => file_name.ends_with(suffix.as_str()),
            Matcher::Pattern(regex) => regex.is_match(file_name),
        }
    }
}

/// Recursively collects every file under `root` whose name matches at least
/// one matcher, as paths relative to `root`.
///
/// Symbolic links are followed. The result order is traversal order, which
/// is not guaranteed stable across platforms; callers must treat it as a
/// set. A nonexistent root yields an error, matching the fail-fast policy
/// for broken build trees.
pub fn collect_files(root: &Path, matchers: &[Matcher]) -> Result<Vec<PathBuf>, PackError> {
    let mut found = Vec::new();
    walk(root, root, matchers, &mut found)?;
    Ok(found)
}

fn walk(
    root: &Path,
    dir: &Path,
    matchers: &[Matcher],
    found: &mut Vec<PathBuf>,
) -> Result<(), PackError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        // is_dir follows symlinks, so linked subtrees are walked too.
        if path.is_dir() {
            walk(root, &path, matchers, found)?;
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if matchers.iter().any(|m| m.matches(file_name)) {
            if let Ok(rel) = path.strip_prefix(root) {
                found.push(rel.to_path_buf());
            }
        }
    }
    Ok(())
}

/// Copies `files` (paths relative to `src_root`) into `dst_root`.
///
/// With `keep_src_path` the relative path is preserved under the
/// destination; otherwise only the base file name is used. A file that
/// cannot be copied (e.g. a broken symlink alias) is logged and skipped —
/// packaging must complete even when a handful of support files are
/// unreadable, so the batch never aborts.
pub fn copy_files(src_root: &Path, dst_root: &Path, files: &[PathBuf], keep_src_path: bool) {
    for file in files {
        let dest = if keep_src_path {
            dst_root.join(file)
        } else {
            match file.file_name() {
                Some(name) => dst_root.join(name),
                None => continue,
            }
        };

        let src = src_root.join(file);
        if let Err(e) = copy_one(&src, &dest) {
            eprintln!("Warning: could not copy {:?}; skipping ({e})", src);
        }
    }
}

fn copy_one(src: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest)?;
    Ok(())
}

/// Recursively copies a directory tree.
///
/// Used by the third-party trimmer to copy allow-listed dependency
/// directories into the rebuilt tree.
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<(), PackError> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let dest_path = dest.join(file_name);
        if path.is_dir() {
            copy_dir_recursive(&path, &dest_path)?;
        } else {
            fs::copy(&path, &dest_path)?;
        }
    }
    Ok(())
}
