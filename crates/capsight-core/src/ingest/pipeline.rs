use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use super::chunker::{split_into_chunks, ChunkConfig};
use super::extractor::{Extractor, LlmExtractor};
use super::merger::{absorb_literal, merge_one};
use super::parser::{CompositeParser, Parser};
use crate::config::{AnalyzerConfig, ConfigError};
use crate::llm::{ClientError, OllamaClient};
use crate::record::FinalRecord;
use crate::variant::{LiteralScanner, ReferenceTable};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Parse error: {0}")]
    Parse(#[from] super::parser::ParseError),
    #[error("Extraction error on chunk {chunk} of {total}: {source}")]
    Extraction {
        chunk: usize,
        total: usize,
        #[source]
        source: super::extractor::ExtractionError,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Model client error: {0}")]
    Client(#[from] ClientError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub chunks_processed: usize,
    pub mutations_from_model: usize,
    pub mutations_from_scan: usize,
    pub matched_variants: usize,
    pub duration_ms: u64,
}

impl AnalysisStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_mutations(&self) -> usize {
        self.mutations_from_model + self.mutations_from_scan
    }
}

pub struct AnalysisOutput {
    pub record: FinalRecord,
    pub stats: AnalysisStats,
}

/// Chunk, extract, merge, sweep, enrich. Chunks are processed strictly one
/// after another and the first failure aborts the run.
pub struct AnalysisPipeline {
    parser: Box<dyn Parser>,
    extractor: Box<dyn Extractor>,
    reference: Arc<ReferenceTable>,
    chunking: ChunkConfig,
    scanner: LiteralScanner,
}

impl AnalysisPipeline {
    #[must_use]
    pub fn new(extractor: Box<dyn Extractor>, reference: Arc<ReferenceTable>) -> Self {
        Self {
            parser: Box::new(CompositeParser::default()),
            extractor,
            reference,
            chunking: ChunkConfig::default(),
            scanner: LiteralScanner::default(),
        }
    }

    /// Pipeline talking to the configured Ollama server.
    pub fn from_config(config: &AnalyzerConfig, reference: Arc<ReferenceTable>) -> AnalysisResult<Self> {
        config.validate()?;

        let client = OllamaClient::new(config.llm.clone())?;
        let mut extractor = LlmExtractor::new(Box::new(client));
        if let Some(template) = &config.prompt_template {
            extractor = extractor.with_template(template.clone());
        }

        Ok(Self::new(Box::new(extractor), reference).with_chunking(config.chunking))
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn Parser>) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_chunking(mut self, chunking: ChunkConfig) -> Self {
        self.chunking = chunking;
        self
    }

    #[must_use]
    pub fn with_scanner(mut self, scanner: LiteralScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn reference(&self) -> &ReferenceTable {
        &self.reference
    }

    /// Analyzes `raw_text`, calling `progress(i, total)` with a 1-based chunk
    /// index before each extraction call.
    pub async fn run<F>(&self, raw_text: &str, mut progress: F) -> AnalysisResult<AnalysisOutput>
    where
        F: FnMut(usize, usize) + Send,
    {
        let start = Instant::now();
        let chunks = split_into_chunks(raw_text, &self.chunking)?;
        let total = chunks.len();
        let mut stats = AnalysisStats::new();

        let mut record = FinalRecord::default();
        for chunk in chunks {
            let position = chunk.index + 1;
            progress(position, total);
            tracing::debug!(
                chunk = position,
                total,
                chars = chunk.text.chars().count(),
                "Extracting chunk"
            );

            let partial = self
                .extractor
                .extract(&chunk.text)
                .await
                .map_err(|source| AnalysisError::Extraction {
                    chunk: position,
                    total,
                    source,
                })?;
            record = merge_one(record, partial);
            stats.chunks_processed += 1;
        }
        stats.mutations_from_model = record.nlrp3_mutations.len();

        stats.mutations_from_scan = absorb_literal(&mut record, self.scanner.scan(raw_text));

        record.enrich_with(&self.reference);
        stats.matched_variants = record
            .nlrp3_mutations_detailed
            .iter()
            .filter(|v| !v.is_unknown())
            .count();

        stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            chunks = stats.chunks_processed,
            mutations = stats.total_mutations(),
            from_scan = stats.mutations_from_scan,
            matched = stats.matched_variants,
            duration_ms = stats.duration_ms,
            "Analysis finished"
        );

        Ok(AnalysisOutput { record, stats })
    }

    pub async fn analyze_file<F>(&self, path: &Path, progress: F) -> AnalysisResult<AnalysisOutput>
    where
        F: FnMut(usize, usize) + Send,
    {
        let document = self.parser.parse_file(path).await?;
        tracing::info!(
            path = %path.display(),
            format = ?document.format,
            chars = document.char_count(),
            "Loaded report"
        );
        self.run(&document.full_text, progress).await
    }
}
