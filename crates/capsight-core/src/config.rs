use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::ingest::ChunkConfig;
use crate::llm::{missing_template_parts, LlmConfig};

pub const ENV_OLLAMA_URL: &str = "CAPSIGHT_OLLAMA_URL";
pub const ENV_MODEL: &str = "CAPSIGHT_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "CAPSIGHT_TIMEOUT_SECS";
pub const ENV_CHUNK_SIZE: &str = "CAPSIGHT_CHUNK_SIZE";
pub const ENV_CHUNK_OVERLAP: &str = "CAPSIGHT_CHUNK_OVERLAP";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid model server URL: {0}")]
    InvalidUrl(String),
    #[error("No model name configured")]
    MissingModel,
    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,
    #[error("Chunk overlap {overlap} must be smaller than chunk size {size}")]
    OverlapTooLarge { overlap: usize, size: usize },
    #[error("Prompt template is missing: {}", .0.join(", "))]
    IncompleteTemplate(Vec<&'static str>),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config file error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a pipeline run needs besides the report and reference table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub llm: LlmConfig,
    pub chunking: ChunkConfig,
    /// Replacement for the built-in extraction prompt
    pub prompt_template: Option<String>,
}

impl AnalyzerConfig {
    /// Defaults overridden by `CAPSIGHT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_json_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Applies overrides looked up by environment variable name.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_OLLAMA_URL) {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.llm.model = model;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.llm.request_timeout_seconds = parse_number(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_CHUNK_SIZE) {
            self.chunking.size = parse_number(ENV_CHUNK_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_CHUNK_OVERLAP) {
            self.chunking.overlap = parse_number(ENV_CHUNK_OVERLAP, &raw)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.llm.validate()?;
        self.chunking.validate()?;
        if let Some(template) = &self.prompt_template {
            let missing = missing_template_parts(template);
            if !missing.is_empty() {
                return Err(ConfigError::IncompleteTemplate(missing));
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalyzerConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.size, 3000);
        assert_eq!(config.chunking.overlap, 200);
    }

    #[test]
    fn test_overrides() {
        let config = AnalyzerConfig::default()
            .with_overrides(lookup(&[
                (ENV_OLLAMA_URL, "http://10.0.0.5:11434"),
                (ENV_MODEL, "llama3.1:8b"),
                (ENV_TIMEOUT_SECS, "120"),
                (ENV_CHUNK_SIZE, " 1500 "),
                (ENV_CHUNK_OVERLAP, "100"),
            ]))
            .unwrap();

        assert_eq!(config.llm.base_url, "http://10.0.0.5:11434");
        assert_eq!(config.llm.model, "llama3.1:8b");
        assert_eq!(config.llm.request_timeout_seconds, 120);
        assert_eq!(config.chunking, ChunkConfig { size: 1500, overlap: 100 });
    }

    #[test]
    fn test_bad_number_override() {
        let result = AnalyzerConfig::default().with_overrides(lookup(&[(ENV_CHUNK_SIZE, "big")]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: ENV_CHUNK_SIZE, .. })
        ));
    }

    #[test]
    fn test_validate_chunking() {
        let config = AnalyzerConfig {
            chunking: ChunkConfig { size: 100, overlap: 200 },
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::OverlapTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_template() {
        let config = AnalyzerConfig {
            prompt_template: Some("Summarize: {report_text}".into()),
            ..Default::default()
        };

        match config.validate() {
            Err(ConfigError::IncompleteTemplate(missing)) => {
                assert!(missing.contains(&"crp_elevated"));
                assert!(!missing.contains(&"{report_text}"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_from_json_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capsight.json");
        std::fs::write(
            &path,
            r#"{"llm": {"model": "qwen2.5"}, "chunking": {"size": 2000}}"#,
        )
        .unwrap();

        let config = AnalyzerConfig::from_json_path(&path).unwrap();

        assert_eq!(config.llm.model, "qwen2.5");
        assert_eq!(config.llm.base_url, crate::llm::DEFAULT_OLLAMA_URL);
        assert_eq!(config.chunking, ChunkConfig { size: 2000, overlap: 200 });
        assert!(config.prompt_template.is_none());
    }

    #[test]
    fn test_from_json_path_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capsight.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            AnalyzerConfig::from_json_path(&path),
            Err(ConfigError::Json(_))
        ));
    }
}
