use std::path::Path;

use anyhow::Result;

use capsight_core::enrich;

use super::load_reference;

/// Prints the reference annotation of each variant as JSON.
pub fn run(variants: &[String], reference: &Path) -> Result<()> {
    let table = load_reference(reference)?;
    let annotated = enrich(variants, &table);
    println!("{}", serde_json::to_string_pretty(&annotated)?);
    Ok(())
}
