//! Build command: run the pipeline and emit the payload.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use atlas_ops::{BuildRequest, OpsContext};

use super::{print_summary, OutputFormat};

/// Scan `path` and write the payload to `output` or stdout.
pub fn execute(
    path: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    ignore_file: Option<&Path>,
) -> Result<()> {
    let mut request = BuildRequest::new(path);
    if let Some(ignore_path) = ignore_file {
        let patterns = fs::read_to_string(ignore_path)
            .with_context(|| format!("failed to read ignore file {}", ignore_path.display()))?;
        request = request.with_ignore(patterns);
    }

    let ctx = OpsContext::default();
    let response = ctx.build(&request)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response.payload)?;
            match output {
                Some(out_path) => {
                    fs::write(out_path, json).with_context(|| {
                        format!("failed to write payload to {}", out_path.display())
                    })?;
                    info!(path = %out_path.display(), "payload written");
                }
                None => println!("{json}"),
            }
        }
        OutputFormat::Summary => {
            print_summary(
                &response.stats,
                response.graph.node_count(),
                response.graph.edge_count(),
            );
        }
    }

    Ok(())
}
