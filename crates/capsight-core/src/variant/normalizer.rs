use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Three-letter to one-letter codes for the twenty standard amino acids.
const AMINO_ACIDS: [(&str, &str); 20] = [
    ("ALA", "A"),
    ("ARG", "R"),
    ("ASN", "N"),
    ("ASP", "D"),
    ("CYS", "C"),
    ("GLN", "Q"),
    ("GLU", "E"),
    ("GLY", "G"),
    ("HIS", "H"),
    ("ILE", "I"),
    ("LEU", "L"),
    ("LYS", "K"),
    ("MET", "M"),
    ("PHE", "F"),
    ("PRO", "P"),
    ("SER", "S"),
    ("THR", "T"),
    ("TRP", "W"),
    ("TYR", "Y"),
    ("VAL", "V"),
];

static NOTATION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(c\.|g\.|p\.|m\.|n\.|chr1:)").expect("valid regex"));

static PROTEIN_CHANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z]{3})(\d+)([A-Za-z]{3})").expect("valid regex"));

pub fn one_letter_code(three: &str) -> Option<&'static str> {
    let upper = three.to_ascii_uppercase();
    AMINO_ACIDS
        .iter()
        .find(|(code, _)| *code == upper)
        .map(|(_, one)| *one)
}

fn is_separator(c: char) -> bool {
    matches!(c, '(' | ')' | '[' | ']' | '\'') || c.is_whitespace()
}

fn convert_code(code: &str) -> String {
    one_letter_code(code).map_or_else(|| code.to_uppercase(), String::from)
}

fn normalize_once(input: &str) -> String {
    let stripped = NOTATION_PREFIX.replace_all(input.trim(), "");
    let compact: String = stripped.chars().filter(|c| !is_separator(*c)).collect();
    let converted = PROTEIN_CHANGE.replace_all(&compact, |caps: &Captures<'_>| {
        format!(
            "{}{}{}",
            convert_code(&caps[1]),
            &caps[2],
            convert_code(&caps[3])
        )
    });
    converted.to_uppercase()
}

/// Canonical matching key for a variant name.
///
/// Strips HGVS notation prefixes wherever they occur, drops brackets,
/// whitespace and apostrophes, collapses `Val34Ala` style protein changes to
/// `V34A`, and upper-cases. The pass is repeated until it reaches a fixed
/// point, so the result is always idempotent.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let mut current = normalize_once(raw);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return Some(current);
        }
        current = next;
    }
}

/// Convenience wrapper for callers that always hold a string.
pub fn normalize_variant(raw: &str) -> String {
    normalize(Some(raw)).unwrap_or_default()
}
