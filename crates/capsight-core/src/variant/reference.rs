use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use super::normalizer::normalize_variant;

pub const CLASSIFICATION_COLUMN: &str = "germline_classification";
pub const NAME_COLUMN: &str = "name";
pub const UNKNOWN_LABEL: &str = "unknown";

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Reference table has no header row")]
    MissingHeader,
}

pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// Germline classification labels a reviewer can assign to a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationLabel {
    #[serde(rename = "Benign/Likely Benign")]
    BenignLikelyBenign,
    #[serde(rename = "VUS")]
    Vus,
    #[serde(rename = "Likely risk allele")]
    LikelyRiskAllele,
    #[serde(rename = "not provided")]
    NotProvided,
    #[serde(rename = "Pathogenic/Likely pathogenic")]
    PathogenicLikelyPathogenic,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ClassificationLabel {
    pub const ALL: [Self; 6] = [
        Self::BenignLikelyBenign,
        Self::Vus,
        Self::LikelyRiskAllele,
        Self::NotProvided,
        Self::PathogenicLikelyPathogenic,
        Self::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BenignLikelyBenign => "Benign/Likely Benign",
            Self::Vus => "VUS",
            Self::LikelyRiskAllele => "Likely risk allele",
            Self::NotProvided => "not provided",
            Self::PathogenicLikelyPathogenic => "Pathogenic/Likely pathogenic",
            Self::Unknown => UNKNOWN_LABEL,
        }
    }

    /// Exact label match, as labels are compared verbatim by the decision rules.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == s.trim())
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified variant from the reference spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRow {
    pub values: Vec<String>,
    pub classification: String,
    pub name: String,
    haystack: String,
}

impl ReferenceRow {
    /// `values` are every column of the row, including the classification and name.
    pub fn new(
        values: Vec<String>,
        classification: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let haystack = values.join(" ").to_uppercase();
        Self {
            values,
            classification: label_or_unknown(classification.into()),
            name: label_or_unknown(name.into()),
            haystack,
        }
    }

    /// Substring match over the joined row text. An empty key matches no row,
    /// unlike plain substring containment where `""` is found everywhere.
    pub fn contains(&self, key: &str) -> bool {
        !key.is_empty() && self.haystack.contains(key)
    }
}

fn label_or_unknown(label: String) -> String {
    if label.trim().is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        label
    }
}

/// Reference table, loaded once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: Vec<ReferenceRow>,
}

impl ReferenceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<ReferenceRow>) -> Self {
        Self { rows }
    }

    pub fn from_csv_path(path: &Path) -> ReferenceResult<Self> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_csv_reader(file)?;
        tracing::info!(
            rows = table.len(),
            path = %path.display(),
            "Loaded reference table"
        );
        Ok(table)
    }

    /// Header names are trimmed and lower-cased before the classification and
    /// name columns are looked up.
    pub fn from_csv_reader<R: Read>(reader: R) -> ReferenceResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(ReferenceError::MissingHeader);
        }

        let class_idx = headers.iter().position(|h| h == CLASSIFICATION_COLUMN);
        let name_idx = headers.iter().position(|h| h == NAME_COLUMN);
        if class_idx.is_none() || name_idx.is_none() {
            tracing::warn!(
                ?headers,
                "Reference table lacks classification or name column; labels default to unknown"
            );
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let values: Vec<String> = record.iter().map(String::from).collect();
            let cell = |idx: Option<usize>| {
                idx.and_then(|i| values.get(i))
                    .cloned()
                    .unwrap_or_default()
            };
            let classification = cell(class_idx);
            let name = cell(name_idx);
            rows.push(ReferenceRow::new(values, classification, name));
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose joined text contains the normalized key.
    pub fn matching<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a ReferenceRow> + 'a {
        self.rows.iter().filter(move |row| row.contains(key))
    }
}

/// Reference annotation of one reported variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantEnrichment {
    pub variant: String,
    pub classification: Vec<String>,
    pub name: Vec<String>,
}

impl VariantEnrichment {
    pub fn unknown(variant: String) -> Self {
        Self {
            variant,
            classification: vec![UNKNOWN_LABEL.to_string()],
            name: vec![UNKNOWN_LABEL.to_string()],
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.primary_classification() == UNKNOWN_LABEL
    }

    /// First classification label, which is what presentation shows.
    pub fn primary_classification(&self) -> &str {
        self.classification
            .first()
            .map_or(UNKNOWN_LABEL, String::as_str)
    }

    pub fn primary_name(&self) -> &str {
        self.name.first().map_or(UNKNOWN_LABEL, String::as_str)
    }

    pub fn override_classification(&mut self, label: ClassificationLabel) {
        self.classification = vec![label.as_str().to_string()];
    }
}

fn push_distinct(labels: &mut Vec<String>, label: &str) {
    if !labels.iter().any(|l| l == label) {
        labels.push(label.to_string());
    }
}

pub fn enrich_one(raw: &str, table: &ReferenceTable) -> VariantEnrichment {
    let key = normalize_variant(raw);

    let mut classification = Vec::new();
    let mut name = Vec::new();
    for row in table.matching(&key) {
        push_distinct(&mut classification, &row.classification);
        push_distinct(&mut name, &row.name);
    }

    if classification.is_empty() {
        tracing::debug!(variant = %key, "No reference match");
        return VariantEnrichment::unknown(key);
    }

    VariantEnrichment {
        variant: key,
        classification,
        name,
    }
}

/// Annotates each variant against the table, one output per input in order.
pub fn enrich<S: AsRef<str>>(variants: &[S], table: &ReferenceTable) -> Vec<VariantEnrichment> {
    variants
        .iter()
        .map(|v| enrich_one(v.as_ref(), table))
        .collect()
}
