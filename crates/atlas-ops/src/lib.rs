//! Operations layer for code-atlas.
//!
//! This crate turns a source tree into a [`atlas_core::GraphPayload`]:
//! it scans the root with exclusion rules, extracts per-file metrics,
//! resolves import/require specifiers into typed edges, clusters files by
//! folder, and aggregates summary statistics. It is consumed by the CLI
//! but has no CLI dependencies of its own.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use atlas_ops::{BuildRequest, OpsContext, OpsResult};
//!
//! fn main() -> OpsResult<()> {
//!     let ctx = OpsContext::default();
//!     let response = ctx.build(&BuildRequest::new("."))?;
//!     println!("{} files", response.stats.total_files);
//!     Ok(())
//! }
//! ```

mod context;
mod error;
mod explain;
mod imports;
mod metrics;
mod scan;
mod stats;

pub use context::{BuildRequest, BuildResponse, Config, OpsContext};
pub use error::{OpsError, OpsResult};
pub use explain::{ExplainClient, MAX_SOURCE_CHARS};
pub use imports::{extract_specifiers, SpecifierIndex};
pub use metrics::{complexity, extract, line_count, FileMetrics};
pub use scan::{is_parseable, scan_root, EXCLUDED_DIRS, EXTENSION_ALLOWLIST, PARSEABLE_EXTENSIONS};
pub use stats::aggregate;
