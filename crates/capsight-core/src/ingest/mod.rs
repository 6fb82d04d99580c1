mod chunker;
mod extractor;
mod merger;
mod parser;
mod pipeline;

pub use chunker::{
    split_into_chunks, ChunkConfig, TextChunk, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
};
pub use extractor::{
    parse_partial_record, ExtractionError, ExtractionResult, Extractor, LlmExtractor,
};
pub use merger::{absorb_literal, merge, merge_one};
pub use parser::{
    fold_pdf_pages, join_paragraphs, load_document, CompositeParser, DocumentFormat,
    ExternalToolParser, ParseError, ParseResult, ParsedDocument, Parser, PlainTextParser,
    SCANNED_TEXT_THRESHOLD,
};
pub use pipeline::{
    AnalysisError, AnalysisOutput, AnalysisPipeline, AnalysisResult, AnalysisStats,
};
