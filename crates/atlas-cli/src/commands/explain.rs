//! Explain command: ask the explanation service about one file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use atlas_ops::ExplainClient;

/// Read `file` and print the service's three-tier explanation.
///
/// The client's contract is always-text: configuration and network
/// failures come back as readable messages, so this command never fails
/// past the point of reading the file itself.
pub async fn execute(file: &Path) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let client = ExplainClient::from_env();
    let explanation = client.explain_file(file, &source).await;
    println!("{explanation}");
    Ok(())
}
