//! code-atlas CLI - scan a source tree and emit a dependency graph.
//!
//! Run `atlas` or `atlas build` to analyze the current directory and print
//! the renderer payload as JSON.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;

use commands::OutputFormat;

/// code-atlas: build a dependency graph with per-file metrics.
///
/// Scans a source tree, extracts line counts, complexity, and git churn,
/// resolves imports into typed edges, and emits a payload for rendering.
#[derive(Parser, Debug)]
#[command(
    name = "atlas",
    author,
    version,
    about = "code-atlas: dependency graphs with per-file metrics",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a source tree and emit the graph payload (default command).
    Build {
        /// Root directory to scan (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Write the payload to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: json or summary.
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Gitignore-syntax pattern file overriding the root .gitignore.
        #[arg(long)]
        ignore_file: Option<PathBuf>,
    },

    /// Scan a source tree and print summary statistics only.
    Stats {
        /// Root directory to scan (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Ask the explanation service to describe one file.
    Explain {
        /// File to explain.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .init();

    let command = cli.command.unwrap_or(Commands::Build {
        path: PathBuf::from("."),
        output: None,
        format: "json".to_string(),
        ignore_file: None,
    });

    match command {
        Commands::Build {
            path,
            output,
            format,
            ignore_file,
        } => {
            let format: OutputFormat = format.parse()?;
            commands::build::execute(&path, output.as_deref(), format, ignore_file.as_deref())
        }

        Commands::Stats { path } => commands::stats::execute(&path),

        Commands::Explain { file } => commands::explain::execute(&file).await,
    }
}
