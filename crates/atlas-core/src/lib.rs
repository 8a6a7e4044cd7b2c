//! Core domain types for code-atlas.
//!
//! A [`RepoGraph`] holds the file and folder nodes discovered during a scan
//! plus the typed edges between them. Insertion is idempotent: re-adding a
//! node id or a `(from, to, kind)` edge triple is a no-op, never an error.
//! The finished graph plus [`GraphStats`] is flattened into a
//! [`GraphPayload`] for the external renderer.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};

/// Cluster sentinel for files that sit directly in the scan root.
pub const ROOT_CLUSTER: &str = "root";

/// Kinds of edges tracked in the repository graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// File-to-file dependency produced by an import/require specifier.
    Import,
    /// Folder-to-child containment (folder to sub-folder or contained file).
    Hierarchy,
    /// Folder-to-folder aggregate derived from a cross-folder import.
    Rollup,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Import => write!(f, "import"),
            EdgeKind::Hierarchy => write!(f, "hierarchy"),
            EdgeKind::Rollup => write!(f, "rollup"),
        }
    }
}

/// A scanned source file with its extracted metrics.
///
/// The node id is the file's absolute path; nodes are immutable once
/// inserted and rebuilt from scratch on every build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    /// Unique node id (absolute path, string form).
    pub id: String,
    /// Display name (basename).
    pub name: String,
    /// Owning folder path relative to the scan root, or [`ROOT_CLUSTER`].
    pub cluster: String,
    /// Absolute filesystem path.
    pub path: PathBuf,
    /// Newline-delimited segment count, always >= 1.
    pub loc: usize,
    /// Branch-token complexity heuristic, always >= 1.
    pub complexity: usize,
    /// Number of version-control commits touching this file.
    pub commits: usize,
}

/// A folder that contains at least one scanned file (directly or transitively).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    /// Unique node id (folder path relative to the scan root).
    pub id: String,
    /// Display name (last path segment).
    pub name: String,
    /// Path segment count relative to the root, >= 1.
    pub depth: usize,
}

/// Any node stored in the repository graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GraphNode {
    /// A scanned source file.
    File(FileNode),
    /// An ancestor folder of at least one scanned file.
    Folder(FolderNode),
}

impl GraphNode {
    /// The unique id of this node.
    pub fn id(&self) -> &str {
        match self {
            GraphNode::File(f) => &f.id,
            GraphNode::Folder(d) => &d.id,
        }
    }

    /// Display name of this node.
    pub fn name(&self) -> &str {
        match self {
            GraphNode::File(f) => &f.name,
            GraphNode::Folder(d) => &d.name,
        }
    }
}

/// A directed, typed edge between two node ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Originating node id.
    pub from: String,
    /// Destination node id.
    pub to: String,
    /// Relationship kind.
    pub kind: EdgeKind,
}

/// The repository graph: nodes plus typed edges behind an idempotent store.
///
/// Nodes are keyed by id, edges by their `(from, to, kind)` triple. Both
/// insertion paths report whether anything was actually added, so callers
/// never need their own check-then-insert dance. Insertion order is
/// preserved: file nodes iterate in scan order, which downstream analytics
/// rely on for deterministic tie-breaking.
///
/// Cycles are representable; nothing in the store or its conversions
/// assumes acyclicity.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RepoGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    #[serde(skip)]
    node_index: HashMap<String, usize>,
    #[serde(skip)]
    edge_index: HashSet<(String, String, EdgeKind)>,
}

impl RepoGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file node. Returns `false` if the id already exists.
    pub fn insert_file(&mut self, file: FileNode) -> bool {
        self.insert_node(GraphNode::File(file))
    }

    /// Insert a folder node. Returns `false` if the id already exists.
    pub fn insert_folder(&mut self, folder: FolderNode) -> bool {
        self.insert_node(GraphNode::Folder(folder))
    }

    fn insert_node(&mut self, node: GraphNode) -> bool {
        let id = node.id().to_string();
        if self.node_index.contains_key(&id) {
            return false;
        }
        self.node_index.insert(id, self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Insert an edge between two existing nodes.
    ///
    /// Returns `false` when the triple is already present or when either
    /// endpoint is unknown; an edge never dangles.
    pub fn insert_edge(&mut self, from: &str, to: &str, kind: EdgeKind) -> bool {
        if !self.node_index.contains_key(from) || !self.node_index.contains_key(to) {
            return false;
        }
        let key = (from.to_string(), to.to_string(), kind);
        if !self.edge_index.insert(key) {
            return false;
        }
        self.edges.push(GraphEdge {
            from: from.to_string(),
            to: to.to_string(),
            kind,
        });
        true
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    /// Whether a node with this id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// File nodes in scan order.
    pub fn file_nodes(&self) -> impl Iterator<Item = &FileNode> {
        self.nodes.iter().filter_map(|n| match n {
            GraphNode::File(f) => Some(f),
            GraphNode::Folder(_) => None,
        })
    }

    /// Folder nodes in creation order.
    pub fn folder_nodes(&self) -> impl Iterator<Item = &FolderNode> {
        self.nodes.iter().filter_map(|n| match n {
            GraphNode::Folder(d) => Some(d),
            GraphNode::File(_) => None,
        })
    }

    /// Edges of one kind, in insertion order.
    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Total node count.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total edge count.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of file nodes.
    pub fn file_count(&self) -> usize {
        self.file_nodes().count()
    }

    /// Number of folder nodes.
    pub fn folder_count(&self) -> usize {
        self.folder_nodes().count()
    }

    /// Whether the graph has no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Convert to a petgraph [`StableDiGraph`] for layout or analysis.
    ///
    /// Returns the graph plus a mapping from node id to petgraph index.
    pub fn to_petgraph(&self) -> (StableDiGraph<GraphNode, EdgeKind>, HashMap<String, NodeIndex>) {
        let mut graph = StableDiGraph::new();
        let mut id_to_index = HashMap::new();

        for node in &self.nodes {
            let idx = graph.add_node(node.clone());
            id_to_index.insert(node.id().to_string(), idx);
        }

        for edge in &self.edges {
            if let (Some(&from_idx), Some(&to_idx)) =
                (id_to_index.get(&edge.from), id_to_index.get(&edge.to))
            {
                graph.add_edge(from_idx, to_idx, edge.kind);
            }
        }

        (graph, id_to_index)
    }
}

/// Summary analytics over a completed graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of file nodes.
    pub total_files: usize,
    /// Number of distinct folder clusters.
    pub clusters: usize,
    /// Mean complexity across file nodes; 0.0 when there are none.
    pub avg_complexity: f64,
    /// Top files by commit count, descending, commits > 0 only.
    pub most_edited: Vec<EditedFile>,
}

/// One entry in the most-edited ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditedFile {
    /// Display name of the file.
    pub file: String,
    /// Commit count.
    pub commits: usize,
}

// =============================================================================
// Renderer payload
// =============================================================================

/// The opaque payload handed to the external renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphPayload {
    /// All nodes with presentation hints attached.
    pub nodes: Vec<PayloadNode>,
    /// All edges, kind made explicit.
    pub edges: Vec<PayloadEdge>,
    /// Summary statistics.
    pub stats: PayloadStats,
}

/// A node as the renderer sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadNode {
    /// Node id (absolute path for files, relative path for folders).
    pub id: String,
    /// Display label.
    pub label: String,
    /// Cluster identity used for grouping and coloring.
    pub cluster: String,
    /// Filesystem path.
    pub path: String,
    /// Line count (0 for folder nodes).
    pub loc: usize,
    /// Complexity heuristic (0 for folder nodes).
    pub complexity: usize,
    /// Commit count (0 for folder nodes).
    pub commits: usize,
    /// Presentation hint derived from the cluster identity.
    pub color: String,
    /// Presentation hint derived from loc (files) or depth (folders).
    pub size: f64,
}

/// An edge as the renderer sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadEdge {
    /// Originating node id.
    pub from: String,
    /// Destination node id.
    pub to: String,
    /// Relationship kind.
    pub kind: EdgeKind,
}

/// Stats block of the payload, field names fixed by the renderer contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadStats {
    /// Mean complexity formatted to two decimals.
    pub avg_complexity: String,
    /// Top files by commit count.
    pub most_edited: Vec<EditedFile>,
    /// Total file-node count.
    pub total_files: usize,
    /// Distinct folder-cluster count.
    pub clusters: usize,
}

impl GraphPayload {
    /// Flatten a graph plus its stats into the renderer payload.
    ///
    /// Presentation hints are deterministic: the color comes from hashing
    /// the cluster identity, the size grows monotonically with line count
    /// for files and shrinks with depth for folders.
    pub fn from_graph(graph: &RepoGraph, stats: &GraphStats) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| match node {
                GraphNode::File(f) => PayloadNode {
                    id: f.id.clone(),
                    label: f.name.clone(),
                    cluster: f.cluster.clone(),
                    path: f.path.to_string_lossy().to_string(),
                    loc: f.loc,
                    complexity: f.complexity,
                    commits: f.commits,
                    color: cluster_color(&f.cluster),
                    size: file_size_hint(f.loc),
                },
                GraphNode::Folder(d) => PayloadNode {
                    id: d.id.clone(),
                    label: d.name.clone(),
                    cluster: d.id.clone(),
                    path: d.id.clone(),
                    loc: 0,
                    complexity: 0,
                    commits: 0,
                    color: cluster_color(&d.id),
                    size: folder_size_hint(d.depth),
                },
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|e| PayloadEdge {
                from: e.from.clone(),
                to: e.to.clone(),
                kind: e.kind,
            })
            .collect();

        Self {
            nodes,
            edges,
            stats: PayloadStats {
                avg_complexity: format!("{:.2}", stats.avg_complexity),
                most_edited: stats.most_edited.clone(),
                total_files: stats.total_files,
                clusters: stats.clusters,
            },
        }
    }

    /// Payload for a missing or empty workspace: no nodes, no edges, zeroed stats.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            stats: PayloadStats {
                avg_complexity: "0.00".to_string(),
                most_edited: Vec::new(),
                total_files: 0,
                clusters: 0,
            },
        }
    }
}

/// Deterministic color for a cluster identity.
///
/// Hashes the cluster string with a fixed-key hasher so the same cluster
/// maps to the same hue on every build and every machine.
pub fn cluster_color(cluster: &str) -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    cluster.hash(&mut hasher);
    let hue = (hasher.finish() % 360) as f64;
    hsl_to_hex(hue, 0.62, 0.55)
}

/// Size hint for file nodes; monotonic, non-decreasing in line count.
pub fn file_size_hint(loc: usize) -> f64 {
    16.0 + (loc as f64).sqrt().min(48.0)
}

/// Size hint for folder nodes; decreases with depth.
pub fn folder_size_hint(depth: usize) -> f64 {
    (48.0 / (depth as f64 + 1.0)).max(14.0)
}

fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        to_byte(r1),
        to_byte(g1),
        to_byte(b1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, cluster: &str, loc: usize, complexity: usize, commits: usize) -> FileNode {
        FileNode {
            id: id.to_string(),
            name: id.rsplit('/').next().unwrap_or(id).to_string(),
            cluster: cluster.to_string(),
            path: PathBuf::from(id),
            loc,
            complexity,
            commits,
        }
    }

    #[test]
    fn node_insertion_is_idempotent() {
        let mut graph = RepoGraph::new();
        assert!(graph.insert_file(file("/r/a.ts", "root", 10, 2, 0)));
        assert!(!graph.insert_file(file("/r/a.ts", "root", 99, 99, 99)));
        assert_eq!(graph.node_count(), 1);

        // First insert wins: attributes are immutable after creation.
        match graph.node("/r/a.ts").unwrap() {
            GraphNode::File(f) => assert_eq!(f.loc, 10),
            other => panic!("Expected file node, got {:?}", other),
        }
    }

    #[test]
    fn edge_insertion_deduplicates_by_triple() {
        let mut graph = RepoGraph::new();
        graph.insert_file(file("/r/a.ts", "root", 1, 1, 0));
        graph.insert_file(file("/r/b.ts", "root", 1, 1, 0));

        assert!(graph.insert_edge("/r/a.ts", "/r/b.ts", EdgeKind::Import));
        assert!(!graph.insert_edge("/r/a.ts", "/r/b.ts", EdgeKind::Import));
        assert_eq!(graph.edge_count(), 1);

        // A different kind between the same endpoints is a distinct edge.
        graph.insert_folder(FolderNode {
            id: "src".to_string(),
            name: "src".to_string(),
            depth: 1,
        });
        assert!(graph.insert_edge("src", "/r/a.ts", EdgeKind::Hierarchy));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn edges_require_existing_endpoints() {
        let mut graph = RepoGraph::new();
        graph.insert_file(file("/r/a.ts", "root", 1, 1, 0));
        assert!(!graph.insert_edge("/r/a.ts", "/r/missing.ts", EdgeKind::Import));
        assert!(!graph.insert_edge("/r/missing.ts", "/r/a.ts", EdgeKind::Import));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn cycles_are_representable() {
        let mut graph = RepoGraph::new();
        graph.insert_file(file("/r/a.ts", "root", 1, 1, 0));
        graph.insert_file(file("/r/b.ts", "root", 1, 1, 0));
        assert!(graph.insert_edge("/r/a.ts", "/r/b.ts", EdgeKind::Import));
        assert!(graph.insert_edge("/r/b.ts", "/r/a.ts", EdgeKind::Import));

        let (pg, index) = graph.to_petgraph();
        assert_eq!(pg.node_count(), 2);
        assert_eq!(pg.edge_count(), 2);
        assert!(petgraph::algo::is_cyclic_directed(&pg));
        assert!(index.contains_key("/r/a.ts"));
    }

    #[test]
    fn payload_hints_are_deterministic() {
        assert_eq!(cluster_color("src"), cluster_color("src"));
        assert_ne!(cluster_color("src"), cluster_color("lib"));

        // Monotonic in loc.
        assert!(file_size_hint(100) >= file_size_hint(10));
        assert!(file_size_hint(10) >= file_size_hint(1));
        // Decreasing in depth.
        assert!(folder_size_hint(1) >= folder_size_hint(3));
    }

    #[test]
    fn payload_formats_stats() {
        let mut graph = RepoGraph::new();
        graph.insert_file(file("/r/a.ts", "root", 10, 3, 7));
        let stats = GraphStats {
            total_files: 1,
            clusters: 1,
            avg_complexity: 3.0,
            most_edited: vec![EditedFile {
                file: "a.ts".to_string(),
                commits: 7,
            }],
        };

        let payload = GraphPayload::from_graph(&graph, &stats);
        assert_eq!(payload.stats.avg_complexity, "3.00");
        assert_eq!(payload.nodes.len(), 1);
        assert_eq!(payload.nodes[0].label, "a.ts");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["stats"]["avgComplexity"], "3.00");
        assert_eq!(json["stats"]["totalFiles"], 1);
        assert_eq!(json["stats"]["mostEdited"][0]["file"], "a.ts");
    }

    #[test]
    fn empty_payload_is_zeroed() {
        let payload = GraphPayload::empty();
        assert!(payload.nodes.is_empty());
        assert!(payload.edges.is_empty());
        assert_eq!(payload.stats.total_files, 0);
        assert_eq!(payload.stats.clusters, 0);
        assert_eq!(payload.stats.avg_complexity, "0.00");
    }
}
