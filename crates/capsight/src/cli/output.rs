use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use capsight_core::review::{apply_answers, apply_mutation_edit};
use capsight_core::{Assessment, FinalRecord, ReferenceTable};

use super::ReviewArgs;

/// Applies `--set` answers and a `--mutations` edit to the record.
pub fn apply_review(
    record: &mut FinalRecord,
    review: &ReviewArgs,
    table: &ReferenceTable,
) -> Result<()> {
    let applied = apply_answers(record, review.answers.iter().map(String::as_str))?;
    if applied > 0 {
        tracing::debug!(applied, "Applied reviewer answers");
    }
    if let Some(edit) = &review.mutations {
        apply_mutation_edit(record, edit, table);
    }
    Ok(())
}

pub fn write_record(record: &FinalRecord, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("{} Record saved to {}", style("✓").green(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn print_variants(record: &FinalRecord) {
    if record.nlrp3_mutations_detailed.is_empty() {
        eprintln!("{} No NLRP3 variants reported", style("○").dim());
        return;
    }

    eprintln!("{}", style("NLRP3 variants").bold());
    for detail in &record.nlrp3_mutations_detailed {
        let class = detail.primary_classification();
        let styled = if detail.is_unknown() {
            style(class).dim()
        } else {
            style(class).cyan()
        };
        eprintln!(
            "  {:<24} {}  {}",
            detail.variant,
            styled,
            style(detail.primary_name()).dim()
        );
    }
}

pub fn print_unresolved(record: &FinalRecord) {
    let unresolved = record.unresolved_fields();
    if unresolved.is_empty() {
        return;
    }

    eprintln!(
        "{} {} item(s) could not be determined from the report:",
        style("?").yellow(),
        unresolved.len()
    );
    for item in unresolved {
        eprintln!("  - {}", item.question());
    }
    eprintln!("  Answer with --set FIELD=true|false|unknown or --mutations \"a, b\"");
}

pub fn print_assessment(assessment: &Assessment) {
    let marker = match assessment {
        Assessment::CapsConfirmed | Assessment::UrgentGeneticTesting { .. } => style("●").red(),
        Assessment::Inconclusive => style("●").yellow(),
        Assessment::NoUrgentTesting => style("●").green(),
        Assessment::InsufficientData => style("○").dim(),
    };
    eprintln!("{marker} {}", style("Conclusion").bold());
    eprintln!("{}", assessment.message());
}
