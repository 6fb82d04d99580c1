use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantNotation {
    Nucleotide,
    Protein,
    Genomic,
    Chromosomal,
}

pub struct VariantPattern {
    pub notation: VariantNotation,
    pub regex: Regex,
}

impl VariantPattern {
    pub fn new(notation: VariantNotation, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            notation,
            regex: Regex::new(&format!("(?i){pattern}"))?,
        })
    }
}

/// A literal variant mention located in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMention {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub notation: VariantNotation,
}

/// Regex sweep over raw report text for variant-like substrings.
///
/// The genomic forms only pin the NLRP3 locus prefix on
/// chromosome 1, not exact coordinate bounds.
pub struct LiteralScanner {
    patterns: Vec<VariantPattern>,
}

impl LiteralScanner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: VariantPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    #[must_use]
    pub fn with_default_patterns() -> Self {
        let defaults = [
            (VariantNotation::Nucleotide, r"c\.\d+[ACGT]{1,100}>[ACGT]{1,100}"),
            (VariantNotation::Protein, r"p\.[A-Za-z]{1,3}\d+[A-Za-z]{1,3}"),
            (
                VariantNotation::Genomic,
                r"g\.247[45][0-9]{5}[ACGT]{1,100}>[ACGT]{1,100}",
            ),
            (
                VariantNotation::Chromosomal,
                r"chr1:247[45][0-9]{5}[ACGT]{1,100}>[ACGT]{1,100}",
            ),
        ];

        let mut scanner = Self::new();
        for (notation, pattern) in defaults {
            match VariantPattern::new(notation, pattern) {
                Ok(p) => scanner.patterns.push(p),
                Err(e) => tracing::warn!("Skipping invalid variant pattern {pattern}: {e}"),
            }
        }
        scanner
    }

    /// Every match of every pattern, ordered by position in the text.
    pub fn mentions(&self, text: &str) -> Vec<VariantMention> {
        let mut mentions: Vec<(usize, VariantMention)> = Vec::new();

        for (order, pattern) in self.patterns.iter().enumerate() {
            for m in pattern.regex.find_iter(text) {
                mentions.push((
                    order,
                    VariantMention {
                        text: m.as_str().trim().to_string(),
                        start: m.start(),
                        end: m.end(),
                        notation: pattern.notation,
                    },
                ));
            }
        }

        mentions.sort_by_key(|(order, m)| (m.start, *order));
        mentions.into_iter().map(|(_, m)| m).collect()
    }

    /// Distinct matched strings in order of first appearance.
    pub fn scan(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.mentions(text)
            .into_iter()
            .filter(|m| seen.insert(m.text.clone()))
            .map(|m| m.text)
            .collect()
    }
}

impl Default for LiteralScanner {
    fn default() -> Self {
        Self::with_default_patterns()
    }
}

static DEFAULT_SCANNER: LazyLock<LiteralScanner> = LazyLock::new(LiteralScanner::default);

/// Recall-boosting sweep for variant notations the classifier may have missed.
/// Never fails; returns an empty list when nothing matches.
pub fn find_literal_mutations(text: &str) -> Vec<String> {
    DEFAULT_SCANNER.scan(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_each_notation() {
        let text = "Выявлен вариант c.1322C>T (p.Ala441Val), \
                    геномно g.247588858C>T, также chr1:247424563G>A.";

        let found = find_literal_mutations(text);

        assert_eq!(
            found,
            vec![
                "c.1322C>T",
                "p.Ala441Val",
                "g.247588858C>T",
                "chr1:247424563G>A"
            ]
        );
    }

    #[test]
    fn test_case_insensitive() {
        let found = find_literal_mutations("variant C.598g>a detected");
        assert_eq!(found, vec!["C.598g>a"]);
    }

    #[test]
    fn test_duplicates_collapse_to_first_occurrence() {
        let found = find_literal_mutations("c.1A>G then c.2C>T then c.1A>G");
        assert_eq!(found, vec!["c.1A>G", "c.2C>T"]);
    }

    #[test]
    fn test_genomic_outside_locus_ignored() {
        assert!(find_literal_mutations("g.123456789C>T").is_empty());
        assert!(find_literal_mutations("chr2:247588858C>T").is_empty());
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(find_literal_mutations("").is_empty());
        assert!(find_literal_mutations("CRP 45 mg/L, SAA elevated").is_empty());
    }

    #[test]
    fn test_mentions_carry_notation_and_offsets() {
        let scanner = LiteralScanner::with_default_patterns();
        let text = "x p.R260W";

        let mentions = scanner.mentions(text);

        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].notation, VariantNotation::Protein);
        assert_eq!(&text[mentions[0].start..mentions[0].end], "p.R260W");
    }

    #[test]
    fn test_custom_scanner() {
        let scanner = LiteralScanner::new()
            .with_pattern(VariantPattern::new(VariantNotation::Nucleotide, r"rs\d+").unwrap());

        assert_eq!(scanner.scan("RS10754558 and rs10754558"), vec!["RS10754558", "rs10754558"]);
    }
}
