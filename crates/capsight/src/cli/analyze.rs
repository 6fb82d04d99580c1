use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use capsight_core::{assess, AnalysisPipeline};

use super::output::{apply_review, print_assessment, print_unresolved, print_variants, write_record};
use super::{load_reference, AnalyzeArgs};

fn chunk_progress() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(template) =
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(template.progress_chars("=>-"));
    }
    bar
}

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let config = args.model.resolve()?;
    let reference = load_reference(&args.reference)?;
    let pipeline = AnalysisPipeline::from_config(&config, Arc::clone(&reference))?;

    eprintln!(
        "{} Analyzing {} with {}",
        style("●").blue(),
        style(args.file.display()).bold(),
        config.llm.model
    );

    let bar = chunk_progress();
    let result = pipeline
        .analyze_file(&args.file, |i, total| {
            bar.set_length(total as u64);
            bar.set_position((i - 1) as u64);
            bar.set_message(format!("chunk {i}/{total}"));
        })
        .await;
    bar.finish_and_clear();

    let output = result.with_context(|| format!("analyzing {}", args.file.display()))?;
    eprintln!(
        "{} {} chunk(s), {} variant(s) ({} from text scan), {} ms",
        style("✓").green(),
        output.stats.chunks_processed,
        output.stats.total_mutations(),
        output.stats.mutations_from_scan,
        output.stats.duration_ms
    );

    let mut record = output.record;
    apply_review(&mut record, &args.review, &reference)?;

    write_record(&record, args.output.as_deref())?;
    print_variants(&record);
    print_unresolved(&record);
    print_assessment(&assess(&record));

    Ok(())
}
