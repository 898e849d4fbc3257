//! Filesystem traversal adapter, backed by `walkdir`.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Dotfiles that are kept even though they start with `.` (spec §4.1:
/// "honors a fixed list of important dotfiles").
const IMPORTANT_DOTFILES: &[&str] = &[
    ".gitignore",
    ".gitattributes",
    ".editorconfig",
    ".eslintrc",
    ".eslintrc.json",
    ".eslintrc.js",
    ".prettierrc",
    ".env.example",
];

/// A candidate file the scanner found, prior to any hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: String,
    pub size: u64,
    pub mtime: i64,
}

pub struct WalkOptions {
    pub root: PathBuf,
    pub include: GlobSet,
    pub exclude: GlobSet,
    pub max_file_bytes: u64,
    pub follow_symlinks: bool,
}

impl WalkOptions {
    pub fn new(
        root: impl Into<PathBuf>,
        include_globs: &[String],
        exclude_globs: &[String],
        max_file_bytes: u64,
        follow_symlinks: bool,
    ) -> Self {
        Self {
            root: root.into(),
            include: build_globset(include_globs),
            exclude: build_globset(exclude_globs),
            max_file_bytes,
            follow_symlinks,
        }
    }
}

fn build_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

fn is_excluded_dotfile(file_name: &str) -> bool {
    file_name.starts_with('.') && !IMPORTANT_DOTFILES.contains(&file_name)
}

/// Result of a single scan pass: the ordered file list plus a count of
/// directory entries skipped due to I/O errors (spec §4.1 Failure).
pub struct WalkResult {
    pub files: Vec<ScannedFile>,
    pub skipped_entries: usize,
}

/// Deterministically walk `opts.root`, applying include/exclude rules.
///
/// Symlink cycles are broken via path canonicalization against a
/// visited-set (spec §4.1 Failure). The scanner never opens file
/// contents — only metadata (`size`, `mtime`) is read.
pub fn walk(opts: &WalkOptions) -> WalkResult {
    let mut files = Vec::new();
    let mut skipped_entries = 0usize;
    let mut visited_dirs: HashSet<PathBuf> = HashSet::new();

    let walker = WalkDir::new(&opts.root)
        .follow_links(opts.follow_symlinks)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "scanner: skipping unreadable directory entry");
                skipped_entries += 1;
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if opts.follow_symlinks {
                if let Ok(canon) = entry.path().canonicalize() {
                    if !visited_dirs.insert(canon) {
                        // Cycle detected via a symlink back to a visited dir.
                        continue;
                    }
                }
            }
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if should_exclude(path, &opts.root, opts) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(err) => {
                warn!(error = %err, path = %path.display(), "scanner: skipping unreadable file metadata");
                skipped_entries += 1;
                continue;
            }
        };

        if metadata.len() > opts.max_file_bytes {
            // Excluded, not failed — still counted once in `skipped`
            // (spec §8 "Files exceeding max_file_bytes are excluded
            // and counted once in skipped").
            skipped_entries += 1;
            continue;
        }

        let rel = relative_path(path, &opts.root);
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        files.push(ScannedFile {
            path: rel,
            size: metadata.len(),
            mtime,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    WalkResult {
        files,
        skipped_entries,
    }
}

fn should_exclude(path: &Path, root: &Path, opts: &WalkOptions) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if is_excluded_dotfile(name) {
            return true;
        }
    }

    let rel = relative_path(path, root);
    if opts.exclude.is_match(&rel) {
        return true;
    }
    if !opts.include.is_empty() && !opts.include.is_match(&rel) {
        return true;
    }
    false
}

fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn excludes_unlisted_dotfiles_but_keeps_allowlisted_ones() {
        assert!(is_excluded_dotfile(".secretrc"));
        assert!(!is_excluded_dotfile(".gitignore"));
    }

    #[test]
    fn walk_is_deterministic_and_respects_excludes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1").unwrap();
        fs::write(dir.path().join("b.py"), "y = 2").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/c.js"), "z").unwrap();

        let opts = WalkOptions::new(
            dir.path(),
            &["**/*".to_string()],
            &["**/node_modules/**".to_string()],
            1_000_000,
            false,
        );

        let result1 = walk(&opts);
        let result2 = walk(&opts);

        assert_eq!(result1.files.len(), 2);
        assert_eq!(
            result1.files.iter().map(|f| &f.path).collect::<Vec<_>>(),
            result2.files.iter().map(|f| &f.path).collect::<Vec<_>>()
        );
        assert!(result1.files.iter().all(|f| !f.path.contains("node_modules")));
    }

    #[test]
    fn walk_excludes_oversize_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("big.py"), "x".repeat(100)).unwrap();

        let opts = WalkOptions::new(dir.path(), &["**/*".to_string()], &[], 10, false);
        let result = walk(&opts);
        assert!(result.files.is_empty());
        assert_eq!(result.skipped_entries, 1);
    }
}
