mod client;
mod config;
mod prompt;

pub use client::{ChatClient, ClientError, ClientResult, OllamaClient};
pub use config::{LlmConfig, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
pub use prompt::{missing_template_parts, render_prompt, PROMPT_TEMPLATE};
