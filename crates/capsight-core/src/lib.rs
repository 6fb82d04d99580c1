#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod decision;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod record;
pub mod review;
pub mod variant;

pub use config::{AnalyzerConfig, ConfigError};
pub use decision::{assess, Assessment, Findings};
pub use error::{Error, Result};
pub use ingest::{
    load_document, AnalysisError, AnalysisOutput, AnalysisPipeline, AnalysisStats, ChunkConfig,
    CompositeParser, DocumentFormat, ExtractionError, Extractor, LlmExtractor, ParseError,
    Parser,
};
pub use llm::{ChatClient, ClientError, LlmConfig, OllamaClient};
pub use record::{
    parse_mutation_list, ClinicalField, ClinicalSigns, FinalRecord, PartialRecord, ReviewItem,
    Tristate,
};
pub use variant::{
    enrich, find_literal_mutations, normalize, normalize_variant, ClassificationLabel,
    ReferenceError, ReferenceTable, VariantEnrichment,
};
