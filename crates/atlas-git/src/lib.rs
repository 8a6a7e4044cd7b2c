//! Churn extraction for code-atlas.
//!
//! One history walk over the whole repository produces a path-to-commit-count
//! map, which the build pipeline consults per file. This replaces per-file
//! history queries: the walk cost is paid once regardless of how many files
//! the scan found.
//!
//! Every failure mode degrades to an empty map: no repository at the root,
//! a repository with no commits yet, a bare repository. Churn is a metric,
//! not a prerequisite.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use git2::{Repository, Sort};
use tracing::debug;

/// Commit counts per workdir-relative path, resolved from absolute paths.
#[derive(Debug, Clone, Default)]
pub struct ChurnMap {
    workdir: Option<PathBuf>,
    counts: HashMap<PathBuf, usize>,
}

impl ChurnMap {
    /// An empty map; every lookup yields 0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Commit count for an absolute file path, 0 when untracked or unknown.
    pub fn commits_for(&self, absolute: &Path) -> usize {
        let Some(workdir) = &self.workdir else {
            return 0;
        };
        absolute
            .strip_prefix(workdir)
            .ok()
            .and_then(|rel| self.counts.get(rel))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct paths with at least one commit.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no history was collected.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Collect churn for the repository containing `root`.
///
/// Walks history from HEAD, diffing each commit against its first parent and
/// counting one entry per touched path. Merge commits therefore count once.
/// Returns an empty map when `root` is not inside a repository or the walk
/// fails for any reason.
pub fn collect_churn(root: &Path) -> ChurnMap {
    let repo = match Repository::discover(root) {
        Ok(repo) => repo,
        Err(err) => {
            debug!(path = %root.display(), error = %err, "no git repository, churn disabled");
            return ChurnMap::empty();
        }
    };

    let Some(workdir) = repo.workdir().map(Path::to_path_buf) else {
        debug!(path = %root.display(), "bare repository, churn disabled");
        return ChurnMap::empty();
    };

    match count_commits_per_path(&repo) {
        Ok(counts) => {
            debug!(paths = counts.len(), "collected churn map");
            ChurnMap {
                workdir: Some(workdir),
                counts,
            }
        }
        Err(err) => {
            debug!(path = %root.display(), error = %err, "history walk failed, churn disabled");
            ChurnMap::empty()
        }
    }
}

fn count_commits_per_path(repo: &Repository) -> Result<HashMap<PathBuf, usize>> {
    let mut counts: HashMap<PathBuf, usize> = HashMap::new();

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TIME)?;
    revwalk.push_head()?;

    for oid_result in revwalk {
        let oid = oid_result?;
        let commit = repo.find_commit(oid)?;

        let parent = commit.parent(0).ok();
        let tree = commit.tree()?;
        let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;

        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        diff.foreach(
            &mut |delta, _| {
                if let Some(path) = delta.new_file().path() {
                    *counts.entry(path.to_path_buf()).or_default() += 1;
                }
                true
            },
            None,
            None,
            None,
        )?;
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, root: &Path, name: &str, content: &str, message: &str) {
        fs::write(root.join(name), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let sig = Signature::now("test", "test@example.com").unwrap();
        let parent = repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .and_then(|oid| repo.find_commit(oid).ok());
        let parents: Vec<_> = parent.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    #[test]
    fn counts_commits_per_file() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        commit_file(&repo, dir.path(), "a.ts", "let a = 1;\n", "add a");
        commit_file(&repo, dir.path(), "a.ts", "let a = 2;\n", "edit a");
        commit_file(&repo, dir.path(), "b.ts", "let b = 1;\n", "add b");

        let churn = collect_churn(dir.path());
        assert_eq!(churn.commits_for(&dir.path().join("a.ts")), 2);
        assert_eq!(churn.commits_for(&dir.path().join("b.ts")), 1);
        assert_eq!(churn.commits_for(&dir.path().join("untracked.ts")), 0);
    }

    #[test]
    fn non_repository_yields_empty_map() {
        let dir = TempDir::new().unwrap();
        let churn = collect_churn(dir.path());
        assert!(churn.is_empty());
        assert_eq!(churn.commits_for(&dir.path().join("a.ts")), 0);
    }

    #[test]
    fn repository_without_commits_yields_empty_map() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        let churn = collect_churn(dir.path());
        assert!(churn.is_empty());
    }
}
