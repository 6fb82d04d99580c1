use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use capsight_core::{find_literal_mutations, load_document};

pub async fn run(file: &Path) -> Result<()> {
    let text = load_document(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;

    let found = find_literal_mutations(&text);
    if found.is_empty() {
        eprintln!("{} No variant notations found", style("○").dim());
        return Ok(());
    }

    for mutation in &found {
        println!("{mutation}");
    }
    eprintln!("{} {} variant notation(s)", style("✓").green(), found.len());
    Ok(())
}
