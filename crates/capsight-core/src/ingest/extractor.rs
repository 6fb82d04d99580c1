use thiserror::Error;

use crate::llm::{render_prompt, ChatClient, ClientError, PROMPT_TEMPLATE};
use crate::record::PartialRecord;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Model reply is not a JSON object: {content}")]
    Parse { content: String },
    #[error("Model call failed: {0}")]
    Client(#[from] ClientError),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Turns one bounded span of report text into the extraction schema.
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, chunk: &str) -> ExtractionResult<PartialRecord>;
}

/// The outermost `{ ... }` span, from the first opening to the last closing brace.
fn brace_span(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (start < end).then(|| &content[start..=end])
}

/// Parses a model reply, recovering an embedded object once if the reply
/// carries prose or code fences around it.
pub fn parse_partial_record(content: &str) -> ExtractionResult<PartialRecord> {
    let parse_error = || ExtractionError::Parse {
        content: content.to_string(),
    };

    let value = match serde_json::from_str::<serde_json::Value>(content) {
        Ok(value) => value,
        Err(e) => {
            let recovered = brace_span(content).ok_or_else(parse_error)?;
            tracing::warn!(
                error = %e,
                reply_chars = content.chars().count(),
                "Model reply is not plain JSON, recovering braced object"
            );
            serde_json::from_str(recovered).map_err(|_| parse_error())?
        }
    };

    PartialRecord::from_json(&value).ok_or_else(parse_error)
}

/// Extractor backed by a chat model.
pub struct LlmExtractor {
    client: Box<dyn ChatClient>,
    template: String,
}

impl LlmExtractor {
    #[must_use]
    pub fn new(client: Box<dyn ChatClient>) -> Self {
        Self {
            client,
            template: PROMPT_TEMPLATE.to_string(),
        }
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait::async_trait]
impl Extractor for LlmExtractor {
    async fn extract(&self, chunk: &str) -> ExtractionResult<PartialRecord> {
        let prompt = render_prompt(&self.template, chunk);
        let reply = self.client.chat(&prompt).await?;
        parse_partial_record(&reply)
    }
}
