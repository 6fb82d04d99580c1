use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;

use capsight_core::{assess, FinalRecord, ReferenceTable};

use super::output::{apply_review, print_unresolved, print_variants};
use super::{load_reference, AssessArgs};

pub fn run(args: &AssessArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.record)
        .with_context(|| format!("reading {}", args.record.display()))?;
    let mut record: FinalRecord = serde_json::from_str(&raw)
        .with_context(|| format!("parsing record {}", args.record.display()))?;

    let table = match &args.reference {
        Some(path) => {
            let table = load_reference(path)?;
            record.enrich_with(&table);
            table
        }
        None => Arc::new(ReferenceTable::new()),
    };
    apply_review(&mut record, &args.review, &table)?;

    let assessment = assess(&record);
    if args.json {
        let report = json!({
            "assessment": assessment,
            "message": assessment.message(),
            "unresolved": record
                .unresolved_fields()
                .iter()
                .map(|item| item.question())
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_variants(&record);
        print_unresolved(&record);
        println!("{}", assessment.message());
    }
    Ok(())
}
