//! CLI command implementations.

pub mod build;
pub mod explain;
pub mod stats;

use std::str::FromStr;

use atlas_core::GraphStats;

/// Payload output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Full renderer payload as JSON.
    Json,
    /// Human-readable summary of the stats block.
    Summary,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "summary" => Ok(OutputFormat::Summary),
            other => anyhow::bail!("unknown format '{other}', expected 'json' or 'summary'"),
        }
    }
}

/// Print the stats block the way `stats` and `build --format summary` share.
pub fn print_summary(stats: &GraphStats, nodes: usize, edges: usize) {
    println!("files:          {}", stats.total_files);
    println!("clusters:       {}", stats.clusters);
    println!("avg complexity: {:.2}", stats.avg_complexity);
    println!("nodes:          {nodes}");
    println!("edges:          {edges}");

    if !stats.most_edited.is_empty() {
        println!("most edited:");
        for entry in &stats.most_edited {
            println!("  {:>4}  {}", entry.commits, entry.file);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_output_formats() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "SUMMARY".parse::<OutputFormat>().unwrap(),
            OutputFormat::Summary
        );
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
