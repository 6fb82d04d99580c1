mod normalizer;
mod reference;
mod scanner;

pub use normalizer::{normalize, normalize_variant, one_letter_code};
pub use reference::{
    enrich, enrich_one, ClassificationLabel, ReferenceError, ReferenceResult, ReferenceRow,
    ReferenceTable, VariantEnrichment, CLASSIFICATION_COLUMN, NAME_COLUMN, UNKNOWN_LABEL,
};
pub use scanner::{
    find_literal_mutations, LiteralScanner, VariantMention, VariantNotation, VariantPattern,
};
