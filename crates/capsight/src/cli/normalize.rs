use anyhow::Result;

use capsight_core::normalize_variant;

pub fn run(variants: &[String]) -> Result<()> {
    for variant in variants {
        println!("{}", normalize_variant(variant));
    }
    Ok(())
}
