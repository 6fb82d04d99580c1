use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

pub const DEFAULT_CHUNK_SIZE: usize = 3000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Window sizes in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub size: usize,
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.overlap >= self.size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.overlap,
                size: self.size,
            });
        }
        Ok(())
    }

    pub const fn stride(&self) -> usize {
        self.size - self.overlap
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    /// Offset of the first character in the source text
    pub start: usize,
    pub text: String,
}

/// Fixed-size sliding windows over `text`.
///
/// Windows start every `size - overlap` characters for as long as the start
/// lies inside the text, so the last one may be shorter and may sit wholly
/// inside the previous window's overlap. Empty input yields no chunks.
pub fn split_into_chunks(text: &str, config: &ChunkConfig) -> Result<Vec<TextChunk>, ConfigError> {
    config.validate()?;

    let chars: Vec<char> = text.chars().collect();
    let stride = config.stride();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + config.size).min(chars.len());
        chunks.push(TextChunk {
            index: chunks.len(),
            start,
            text: chars[start..end].iter().collect(),
        });
        start += stride;
    }

    Ok(chunks)
}
