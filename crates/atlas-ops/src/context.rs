//! OpsContext - the build pipeline entry point.
//!
//! One call to [`OpsContext::build`] runs the whole pipeline: scan the root,
//! collect the churn map, extract per-file metrics, build the basename
//! index, resolve imports, assemble the graph, and aggregate statistics.
//! Every stage degrades instead of failing: the worst case is a smaller but
//! still valid graph.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use atlas_core::{
    EdgeKind, FileNode, FolderNode, GraphPayload, GraphStats, RepoGraph, ROOT_CLUSTER,
};
use atlas_git::collect_churn;

use crate::error::OpsResult;
use crate::imports::{extract_specifiers, SpecifierIndex};
use crate::metrics;
use crate::scan::{is_parseable, scan_root};
use crate::stats;

/// Tunables for a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of entries in the most-edited ranking.
    pub top_edited: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { top_edited: 5 }
    }
}

/// A single build request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Root directory to scan.
    pub root: PathBuf,
    /// Gitignore-syntax pattern text; `None` means use the root `.gitignore`.
    pub ignore: Option<String>,
}

impl BuildRequest {
    /// Build request for a root with default ignore handling.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore: None,
        }
    }

    /// Override the ignore rules with explicit pattern text.
    pub fn with_ignore(mut self, patterns: impl Into<String>) -> Self {
        self.ignore = Some(patterns.into());
        self
    }
}

/// Everything one build produces.
#[derive(Debug, Clone, Serialize)]
pub struct BuildResponse {
    /// The assembled graph.
    pub graph: RepoGraph,
    /// Aggregate statistics.
    pub stats: GraphStats,
    /// The renderer payload.
    pub payload: GraphPayload,
}

impl BuildResponse {
    fn empty() -> Self {
        Self {
            graph: RepoGraph::new(),
            stats: GraphStats::default(),
            payload: GraphPayload::empty(),
        }
    }
}

/// The main operations context.
///
/// Stateless across builds: each call is a pure function of the filesystem
/// and version-control history at call time.
#[derive(Debug, Clone, Default)]
pub struct OpsContext {
    /// Build configuration.
    pub config: Config,
}

impl OpsContext {
    /// Create a context with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run one build over `request.root`.
    ///
    /// A missing root yields an empty graph and zeroed stats rather than
    /// an error, mirroring the no-workspace case.
    pub fn build(&self, request: &BuildRequest) -> OpsResult<BuildResponse> {
        let root = match fs::canonicalize(&request.root) {
            Ok(root) if root.is_dir() => root,
            _ => {
                warn!(path = %request.root.display(), "root not found, returning empty graph");
                return Ok(BuildResponse::empty());
            }
        };

        let files = scan_root(&root, request.ignore.as_deref())?;
        let churn = collect_churn(&root);

        let mut graph = RepoGraph::new();
        let mut contents: HashMap<PathBuf, String> = HashMap::new();

        // First pass: file nodes with metrics, folder tier, hierarchy edges.
        for path in &files {
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "unreadable file omitted");
                    continue;
                }
            };

            let file_metrics = metrics::extract(&content);
            let cluster = cluster_of(&root, path);
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());

            graph.insert_file(FileNode {
                id: node_id(path),
                name,
                cluster: cluster.clone(),
                path: path.clone(),
                loc: file_metrics.loc,
                complexity: file_metrics.complexity,
                commits: churn.commits_for(path),
            });

            add_folder_tier(&mut graph, &root, path);

            if is_parseable(path) {
                contents.insert(path.clone(), content);
            }
        }

        // The index covers the full scan before any resolution query runs.
        let index = SpecifierIndex::build(&files);

        // Second pass: import edges plus folder-level rollups.
        for path in &files {
            let Some(content) = contents.get(path) else {
                continue;
            };
            for specifier in extract_specifiers(path, content) {
                let Some(target) = index.resolve(path, &specifier) else {
                    continue;
                };
                if target == *path {
                    continue;
                }

                graph.insert_edge(&node_id(path), &node_id(&target), EdgeKind::Import);

                let from_cluster = cluster_of(&root, path);
                let to_cluster = cluster_of(&root, &target);
                if from_cluster != to_cluster {
                    // No-op unless both clusters exist as folder nodes, so
                    // root-level files never produce a rollup.
                    graph.insert_edge(&from_cluster, &to_cluster, EdgeKind::Rollup);
                }
            }
        }

        let stats = stats::aggregate(&graph, self.config.top_edited);
        let payload = GraphPayload::from_graph(&graph, &stats);

        info!(
            files = stats.total_files,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built repository graph"
        );

        Ok(BuildResponse {
            graph,
            stats,
            payload,
        })
    }
}

fn node_id(path: &Path) -> String {
    path.display().to_string()
}

/// Owning-folder cluster of a file, relative to the root.
fn cluster_of(root: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(root).unwrap_or(file);
    match rel.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => path_key(parent),
        _ => ROOT_CLUSTER.to_string(),
    }
}

/// Relative path as a stable, slash-separated node id.
fn path_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Insert folder nodes for every ancestor of `file` below the root, wiring
/// each to its parent folder and the innermost one to the file itself.
fn add_folder_tier(graph: &mut RepoGraph, root: &Path, file: &Path) {
    let rel = file.strip_prefix(root).unwrap_or(file);
    let Some(parent) = rel.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return;
    };

    let segments: Vec<String> = parent
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    let mut previous: Option<String> = None;
    for depth in 1..=segments.len() {
        let id = segments[..depth].join("/");
        graph.insert_folder(FolderNode {
            id: id.clone(),
            name: segments[depth - 1].clone(),
            depth,
        });
        if let Some(parent_id) = &previous {
            graph.insert_edge(parent_id, &id, EdgeKind::Hierarchy);
        }
        previous = Some(id);
    }

    if let Some(folder_id) = previous {
        graph.insert_edge(&folder_id, &node_id(file), EdgeKind::Hierarchy);
    }
}
