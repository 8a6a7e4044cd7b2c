//! Directory scanning with exclusion rules.
//!
//! The scanner walks a root depth-first and returns every regular file whose
//! extension is on the allowlist. A fixed set of directory names is always
//! pruned; gitignore-syntax rules (supplied directly or read from the root
//! `.gitignore`) are evaluated once per path, before descending into
//! directories or accepting files. Unreadable subtrees are skipped silently.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{OpsError, OpsResult};

/// Directory names pruned regardless of ignore rules.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    "__pycache__",
    ".venv",
    "venv",
    "vendor",
    ".next",
    "coverage",
];

/// File extensions that become graph nodes.
pub const EXTENSION_ALLOWLIST: &[&str] = &[
    "ts", "tsx", "js", "jsx", "py", "rs", "go", "java", "c", "cpp", "h", "hpp", "rb", "cs",
];

/// The subset of extensions whose syntax trees are parsed for import edges.
pub const PARSEABLE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Whether this file's imports can be extracted from its syntax tree.
pub fn is_parseable(path: &Path) -> bool {
    extension(path).is_some_and(|ext| PARSEABLE_EXTENSIONS.contains(&ext))
}

fn has_allowed_extension(path: &Path) -> bool {
    extension(path).is_some_and(|ext| EXTENSION_ALLOWLIST.contains(&ext))
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Scan `root` and return eligible file paths in deterministic order.
///
/// `ignore_text` is gitignore-syntax pattern text; when `None`, the root
/// `.gitignore` is used if present. Directory entries are visited in lexical
/// order so repeated scans of an unchanged tree yield identical output.
pub fn scan_root(root: &Path, ignore_text: Option<&str>) -> OpsResult<Vec<PathBuf>> {
    let matcher = build_ignore_matcher(root, ignore_text)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| keep_entry(root, &matcher, e))
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() && has_allowed_extension(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    debug!(root = %root.display(), files = files.len(), "scan complete");
    Ok(files)
}

fn keep_entry(root: &Path, matcher: &Gitignore, entry: &DirEntry) -> bool {
    // The root itself is never filtered.
    if entry.depth() == 0 {
        return true;
    }

    if entry.file_type().is_dir() && is_excluded_dir(entry) {
        return false;
    }

    let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
    !matcher
        .matched(rel, entry.file_type().is_dir())
        .is_ignore()
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| EXCLUDED_DIRS.contains(&name))
        .unwrap_or(false)
}

fn build_ignore_matcher(root: &Path, ignore_text: Option<&str>) -> OpsResult<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);

    match ignore_text {
        Some(text) => {
            for line in text.lines() {
                builder
                    .add_line(None, line)
                    .map_err(|err| OpsError::IgnorePattern {
                        path: root.to_path_buf(),
                        message: err.to_string(),
                    })?;
            }
        }
        None => {
            let gitignore = root.join(".gitignore");
            if gitignore.is_file() {
                // A malformed project .gitignore should not abort the scan.
                if let Some(err) = builder.add(&gitignore) {
                    warn!(path = %gitignore.display(), error = %err, "skipping unreadable ignore rules");
                }
            }
        }
    }

    builder.build().map_err(|err| OpsError::IgnorePattern {
        path: root.to_path_buf(),
        message: err.to_string(),
    })
}
