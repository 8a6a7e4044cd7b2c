//! Summary analytics over a completed graph.

use atlas_core::{EditedFile, GraphStats, RepoGraph};

/// Compute summary statistics for the graph.
///
/// The most-edited ranking is restricted to files with at least one commit,
/// sorted descending; the stable sort keeps ties in scan order. Cluster
/// count is the number of distinct owning-folder values across file nodes,
/// so a repository of root-level files still counts as one cluster.
pub fn aggregate(graph: &RepoGraph, top_n: usize) -> GraphStats {
    let total_files = graph.file_count();

    let avg_complexity = if total_files == 0 {
        0.0
    } else {
        let total: usize = graph.file_nodes().map(|f| f.complexity).sum();
        total as f64 / total_files as f64
    };

    let mut clusters: Vec<&str> = graph.file_nodes().map(|f| f.cluster.as_str()).collect();
    clusters.sort_unstable();
    clusters.dedup();

    let mut ranked: Vec<_> = graph.file_nodes().filter(|f| f.commits > 0).collect();
    ranked.sort_by(|a, b| b.commits.cmp(&a.commits));

    GraphStats {
        total_files,
        clusters: clusters.len(),
        avg_complexity,
        most_edited: ranked
            .into_iter()
            .take(top_n)
            .map(|f| EditedFile {
                file: f.name.clone(),
                commits: f.commits,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::FileNode;
    use std::path::PathBuf;

    fn file(id: &str, cluster: &str, complexity: usize, commits: usize) -> FileNode {
        FileNode {
            id: id.to_string(),
            name: id.rsplit('/').next().unwrap_or(id).to_string(),
            cluster: cluster.to_string(),
            path: PathBuf::from(id),
            loc: 1,
            complexity,
            commits,
        }
    }

    #[test]
    fn empty_graph_has_zeroed_stats() {
        let stats = aggregate(&RepoGraph::new(), 5);
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.clusters, 0);
        assert_eq!(stats.avg_complexity, 0.0);
        assert!(stats.most_edited.is_empty());
    }

    #[test]
    fn averages_complexity_and_counts_clusters() {
        let mut graph = RepoGraph::new();
        graph.insert_file(file("/r/src/a.ts", "src", 2, 0));
        graph.insert_file(file("/r/src/b.ts", "src", 4, 0));
        graph.insert_file(file("/r/lib/c.ts", "lib", 6, 0));

        let stats = aggregate(&graph, 5);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.clusters, 2);
        assert!((stats.avg_complexity - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn most_edited_excludes_untouched_and_breaks_ties_by_scan_order() {
        let mut graph = RepoGraph::new();
        graph.insert_file(file("/r/a.ts", "root", 1, 3));
        graph.insert_file(file("/r/b.ts", "root", 1, 0));
        graph.insert_file(file("/r/c.ts", "root", 1, 7));
        graph.insert_file(file("/r/d.ts", "root", 1, 3));

        let stats = aggregate(&graph, 5);
        let names: Vec<_> = stats.most_edited.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(names, vec!["c.ts", "a.ts", "d.ts"]);
    }

    #[test]
    fn most_edited_is_capped_at_top_n() {
        let mut graph = RepoGraph::new();
        for i in 0..8 {
            graph.insert_file(file(&format!("/r/f{i}.ts"), "root", 1, i + 1));
        }
        let stats = aggregate(&graph, 5);
        assert_eq!(stats.most_edited.len(), 5);
        assert_eq!(stats.most_edited[0].commits, 8);
    }
}
