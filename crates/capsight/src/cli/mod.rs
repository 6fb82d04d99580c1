pub mod analyze;
pub mod assess;
pub mod lookup;
pub mod normalize;
pub mod output;
pub mod scan;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use capsight_core::{AnalyzerConfig, ReferenceTable};

#[derive(Parser)]
#[command(
    name = "capsight",
    about = "CAPS screening over clinical reports",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a clinical report with the local model
    Analyze(AnalyzeArgs),
    /// Print the matching key for each variant
    Normalize {
        /// Variant names as written in a report
        #[arg(required = true)]
        variants: Vec<String>,
    },
    /// Look variants up in the reference table
    Lookup {
        /// Variant names as written in a report
        #[arg(required = true)]
        variants: Vec<String>,
        /// Reference table (CSV)
        #[arg(short, long, env = "CAPSIGHT_REFERENCE")]
        reference: PathBuf,
    },
    /// List variant notations found literally in a report
    Scan {
        /// Report file (PDF, DOC, DOCX, TXT, MD)
        file: PathBuf,
    },
    /// Re-assess a saved record
    Assess(AssessArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Report file (PDF, DOC, DOCX, TXT, MD)
    pub file: PathBuf,
    /// Reference table (CSV)
    #[arg(short, long, env = "CAPSIGHT_REFERENCE")]
    pub reference: PathBuf,
    /// Write the record JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub model: ModelArgs,
    #[command(flatten)]
    pub review: ReviewArgs,
}

#[derive(Args)]
pub struct AssessArgs {
    /// Record JSON written by `capsight analyze`
    pub record: PathBuf,
    /// Reference table used to re-annotate edited mutations
    #[arg(short, long, env = "CAPSIGHT_REFERENCE")]
    pub reference: Option<PathBuf>,
    /// Print the assessment as JSON
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub review: ReviewArgs,
}

#[derive(Args, Default)]
pub struct ModelArgs {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Ollama base URL
    #[arg(long)]
    pub ollama_url: Option<String>,
    /// Model tag
    #[arg(long)]
    pub model: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl ModelArgs {
    /// Defaults, then the config file, then `CAPSIGHT_*` variables, then flags.
    pub fn resolve(&self) -> Result<AnalyzerConfig> {
        let base = match &self.config {
            Some(path) => AnalyzerConfig::from_json_path(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => AnalyzerConfig::default(),
        };
        let mut config = base.with_overrides(|key| std::env::var(key).ok())?;

        if let Some(url) = &self.ollama_url {
            config.llm.base_url.clone_from(url);
        }
        if let Some(model) = &self.model {
            config.llm.model.clone_from(model);
        }
        if let Some(timeout) = self.timeout {
            config.llm.request_timeout_seconds = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Default)]
pub struct ReviewArgs {
    /// Answer an unresolved field, e.g. --set hives=true
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub answers: Vec<String>,
    /// Replace the mutation list, e.g. --mutations "c.1322C>T, p.Ala441Val"
    #[arg(long)]
    pub mutations: Option<String>,
}

pub fn load_reference(path: &Path) -> Result<Arc<ReferenceTable>> {
    let table = ReferenceTable::from_csv_path(path)
        .with_context(|| format!("loading reference table {}", path.display()))?;
    Ok(Arc::new(table))
}
