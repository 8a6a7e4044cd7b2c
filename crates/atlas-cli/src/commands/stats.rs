//! Stats command: run the pipeline and print the summary block.

use std::path::Path;

use anyhow::Result;

use atlas_ops::{BuildRequest, OpsContext};

use super::print_summary;

/// Scan `path` and print summary statistics.
pub fn execute(path: &Path) -> Result<()> {
    let ctx = OpsContext::default();
    let response = ctx.build(&BuildRequest::new(path))?;

    print_summary(
        &response.stats,
        response.graph.node_count(),
        response.graph.edge_count(),
    );
    Ok(())
}
