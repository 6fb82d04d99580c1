use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Extracted PDF text shorter than this is assumed to come from a scan.
pub const SCANNED_TEXT_THRESHOLD: usize = 50;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("No parser available for {0:?} documents")]
    BackendUnavailable(DocumentFormat),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Parse failed: {0}")]
    ParseFailed(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Markdown,
    Pdf,
    Docx,
    Doc,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(Self::PlainText),
            "md" | "markdown" => Some(Self::Markdown),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> ParseResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ParseError::UnsupportedFormat("no extension".into()))?;

        Self::from_extension(ext).ok_or_else(|| ParseError::UnsupportedFormat(ext.into()))
    }

    fn extension(self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Markdown => "md",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Doc => "doc",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub format: DocumentFormat,
    pub full_text: String,
    pub ocr_applied: bool,
}

impl ParsedDocument {
    #[must_use]
    pub fn new(format: DocumentFormat, full_text: String) -> Self {
        Self {
            format,
            full_text,
            ocr_applied: false,
        }
    }

    pub fn char_count(&self) -> usize {
        self.full_text.chars().count()
    }

    /// A PDF with (almost) no text layer is most likely a scanned image.
    pub fn looks_scanned(&self) -> bool {
        self.format == DocumentFormat::Pdf
            && self.full_text.trim().chars().count() < SCANNED_TEXT_THRESHOLD
    }
}

#[async_trait::async_trait]
pub trait Parser: Send + Sync {
    fn supported_formats(&self) -> &[DocumentFormat];

    fn can_parse(&self, format: DocumentFormat) -> bool {
        self.supported_formats().contains(&format)
    }

    async fn parse_bytes(&self, data: &[u8], format: DocumentFormat) -> ParseResult<ParsedDocument>;

    async fn parse_file(&self, path: &Path) -> ParseResult<ParsedDocument> {
        let format = DocumentFormat::from_path(path)?;

        if !self.can_parse(format) {
            return Err(ParseError::BackendUnavailable(format));
        }

        let data = tokio::fs::read(path).await?;
        self.parse_bytes(&data, format).await
    }
}

pub struct PlainTextParser;

impl PlainTextParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Parser for PlainTextParser {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::PlainText, DocumentFormat::Markdown]
    }

    async fn parse_bytes(&self, data: &[u8], format: DocumentFormat) -> ParseResult<ParsedDocument> {
        let text = String::from_utf8(data.to_vec())
            .map_err(|e| ParseError::Encoding(e.to_string()))?;

        Ok(ParsedDocument::new(format, text))
    }
}

/// Joins the non-empty pages of `pdftotext` output and folds line breaks into
/// spaces, so sentences broken across lines stay searchable.
pub fn fold_pdf_pages(raw: &str) -> String {
    raw.split('\u{c}')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect::<String>()
        .replace('\n', " ")
}

/// Keeps non-blank paragraphs separated by an empty line.
pub fn join_paragraphs(raw: &str) -> String {
    raw.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

struct ExternalTool {
    format: DocumentFormat,
    program: PathBuf,
}

impl ExternalTool {
    fn args(&self, input: &Path) -> Vec<OsString> {
        match self.format {
            DocumentFormat::Pdf => vec![
                "-enc".into(),
                "UTF-8".into(),
                input.as_os_str().to_owned(),
                "-".into(),
            ],
            DocumentFormat::Docx => vec![
                "-t".into(),
                "plain".into(),
                "--wrap=none".into(),
                input.as_os_str().to_owned(),
            ],
            _ => vec![input.as_os_str().to_owned()],
        }
    }

    fn post_process(&self, raw: &str) -> String {
        match self.format {
            DocumentFormat::Pdf => fold_pdf_pages(raw),
            _ => join_paragraphs(raw),
        }
    }
}

/// Converts office formats with command-line tools found on `PATH`:
/// `pdftotext` for PDF, `pandoc` for DOCX and `antiword` for legacy DOC.
pub struct ExternalToolParser {
    tools: Vec<ExternalTool>,
    formats: Vec<DocumentFormat>,
}

impl ExternalToolParser {
    #[must_use]
    pub fn detect() -> Self {
        let candidates = [
            (DocumentFormat::Pdf, "pdftotext"),
            (DocumentFormat::Docx, "pandoc"),
            (DocumentFormat::Doc, "antiword"),
        ];

        let mut tools = Vec::new();
        for (format, binary) in candidates {
            match which::which(binary) {
                Ok(program) => tools.push(ExternalTool { format, program }),
                Err(_) => tracing::debug!("{binary} not found; {format:?} documents unsupported"),
            }
        }

        let formats = tools.iter().map(|t| t.format).collect();
        Self { tools, formats }
    }

    fn tool_for(&self, format: DocumentFormat) -> ParseResult<&ExternalTool> {
        self.tools
            .iter()
            .find(|t| t.format == format)
            .ok_or(ParseError::BackendUnavailable(format))
    }

    async fn run(&self, tool: &ExternalTool, input: &Path) -> ParseResult<ParsedDocument> {
        let output = Command::new(&tool.program)
            .args(tool.args(input))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(ParseError::ParseFailed(format!(
                "{} exited with {:?}: {}",
                tool.program.display(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        Ok(ParsedDocument::new(tool.format, tool.post_process(&raw)))
    }
}

#[async_trait::async_trait]
impl Parser for ExternalToolParser {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &self.formats
    }

    async fn parse_bytes(&self, data: &[u8], format: DocumentFormat) -> ParseResult<ParsedDocument> {
        let tool = self.tool_for(format)?;
        let staged = tempfile::Builder::new()
            .suffix(&format!(".{}", format.extension()))
            .tempfile()?;
        tokio::fs::write(staged.path(), data).await?;
        self.run(tool, staged.path()).await
    }

    async fn parse_file(&self, path: &Path) -> ParseResult<ParsedDocument> {
        let format = DocumentFormat::from_path(path)?;
        let tool = self.tool_for(format)?;
        self.run(tool, path).await
    }
}

pub struct CompositeParser {
    parsers: Vec<Box<dyn Parser>>,
    ocr_fallback: Option<Box<dyn Parser>>,
}

impl CompositeParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
            ocr_fallback: None,
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn Parser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Parser consulted when a PDF comes back without a usable text layer.
    #[must_use]
    pub fn with_ocr_fallback(mut self, parser: Box<dyn Parser>) -> Self {
        self.ocr_fallback = Some(parser);
        self
    }

    pub fn add_parser(&mut self, parser: Box<dyn Parser>) {
        self.parsers.push(parser);
    }

    fn find_parser(&self, format: DocumentFormat) -> Option<&dyn Parser> {
        self.parsers.iter().find(|p| p.can_parse(format)).map(|p| p.as_ref())
    }

    async fn recover_scan(
        &self,
        document: ParsedDocument,
        data: &[u8],
    ) -> ParseResult<ParsedDocument> {
        if !document.looks_scanned() {
            return Ok(document);
        }

        match &self.ocr_fallback {
            Some(ocr) if ocr.can_parse(DocumentFormat::Pdf) => {
                tracing::info!(
                    chars = document.char_count(),
                    "PDF has no text layer, running OCR fallback"
                );
                let mut recovered = ocr.parse_bytes(data, DocumentFormat::Pdf).await?;
                recovered.ocr_applied = true;
                Ok(recovered)
            }
            _ => {
                tracing::warn!(
                    chars = document.char_count(),
                    "PDF looks scanned and no OCR fallback is configured"
                );
                Ok(document)
            }
        }
    }
}

impl Default for CompositeParser {
    fn default() -> Self {
        Self::new()
            .with_parser(Box::new(PlainTextParser::new()))
            .with_parser(Box::new(ExternalToolParser::detect()))
    }
}

#[async_trait::async_trait]
impl Parser for CompositeParser {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[
            DocumentFormat::PlainText,
            DocumentFormat::Markdown,
            DocumentFormat::Pdf,
            DocumentFormat::Docx,
            DocumentFormat::Doc,
        ]
    }

    fn can_parse(&self, format: DocumentFormat) -> bool {
        self.find_parser(format).is_some()
    }

    async fn parse_bytes(&self, data: &[u8], format: DocumentFormat) -> ParseResult<ParsedDocument> {
        let parser = self
            .find_parser(format)
            .ok_or(ParseError::BackendUnavailable(format))?;

        let document = parser.parse_bytes(data, format).await?;
        self.recover_scan(document, data).await
    }

    async fn parse_file(&self, path: &Path) -> ParseResult<ParsedDocument> {
        let format = DocumentFormat::from_path(path)?;
        let data = tokio::fs::read(path).await?;
        self.parse_bytes(&data, format).await
    }
}

/// Reads a report from disk with the default parser set.
pub async fn load_document(path: &Path) -> ParseResult<String> {
    let document = CompositeParser::default().parse_file(path).await?;
    Ok(document.full_text)
}
