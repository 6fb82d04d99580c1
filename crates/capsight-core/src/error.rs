use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Document error: {0}")]
    Parse(#[from] crate::ingest::ParseError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] crate::ingest::ExtractionError),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] crate::ingest::AnalysisError),

    #[error("Reference table error: {0}")]
    Reference(#[from] crate::variant::ReferenceError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Model client error: {0}")]
    Client(#[from] crate::llm::ClientError),

    #[error("Unknown clinical field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidSignValue { field: String, value: String },

    #[error("Unknown classification label: {0}")]
    UnknownLabel(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
