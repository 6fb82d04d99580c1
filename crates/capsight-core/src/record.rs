use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::variant::{enrich, enrich_one, ReferenceTable, VariantEnrichment};

/// A clinical sign as reported by one source: present, absent, or not stated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tristate {
    True,
    False,
    #[default]
    Unknown,
}

impl Tristate {
    pub fn is_definite(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Unknown => None,
        }
    }

    /// Only JSON booleans are definite; anything else a model writes is unknown,
    /// including the numbers `1` and `0`.
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        match value {
            Some(serde_json::Value::Bool(true)) => Self::True,
            Some(serde_json::Value::Bool(false)) => Self::False,
            _ => Self::Unknown,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" => Some(Self::True),
            "false" | "no" | "n" => Some(Self::False),
            "unknown" | "?" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl Serialize for Tristate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::True => serializer.serialize_bool(true),
            Self::False => serializer.serialize_bool(false),
            Self::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

struct TristateVisitor;

impl Visitor<'_> for TristateVisitor {
    type Value = Tristate;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("true, false or \"unknown\"")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Tristate, E> {
        Ok(Tristate::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Tristate, E> {
        if v.eq_ignore_ascii_case("unknown") {
            Ok(Tristate::Unknown)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<Tristate, E> {
        Ok(Tristate::Unknown)
    }

    fn visit_none<E: de::Error>(self) -> Result<Tristate, E> {
        Ok(Tristate::Unknown)
    }
}

impl<'de> Deserialize<'de> for Tristate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TristateVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClinicalField {
    CrpElevated,
    SaaElevated,
    Hives,
    Triggers,
    SensorineuralHearingLoss,
    AsepticMeningitis,
    SkeletalAbnormalities,
    EyeLesions,
}

impl ClinicalField {
    pub const ALL: [Self; 8] = [
        Self::CrpElevated,
        Self::SaaElevated,
        Self::Hives,
        Self::Triggers,
        Self::SensorineuralHearingLoss,
        Self::AsepticMeningitis,
        Self::SkeletalAbnormalities,
        Self::EyeLesions,
    ];

    /// JSON key used by the extraction schema and the serialized record.
    pub fn key(self) -> &'static str {
        match self {
            Self::CrpElevated => "crp_elevated",
            Self::SaaElevated => "saa_elevated",
            Self::Hives => "hives",
            Self::Triggers => "triggers",
            Self::SensorineuralHearingLoss => "sensorineural_hearing_loss",
            Self::AsepticMeningitis => "aseptic_meningitis",
            Self::SkeletalAbnormalities => "skeletal_abnormalities",
            Self::EyeLesions => "eye_lesions",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Clarifying question shown when the field could not be resolved.
    pub fn question(self) -> &'static str {
        match self {
            Self::CrpElevated => "Is the patient's CRP elevated?",
            Self::SaaElevated => "Is the patient's SAA elevated?",
            Self::Hives => "Is urticaria (hives) mentioned?",
            Self::Triggers => "Are attack triggers (cold, stress) reported?",
            Self::SensorineuralHearingLoss => "Is sensorineural hearing loss present?",
            Self::AsepticMeningitis => "Are there signs of aseptic meningitis?",
            Self::SkeletalAbnormalities => "Are skeletal abnormalities present?",
            Self::EyeLesions => "Are eye lesions (conjunctivitis, uveitis, ...) present?",
        }
    }
}

impl fmt::Display for ClinicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalSigns {
    #[serde(default)]
    pub crp_elevated: Tristate,
    #[serde(default)]
    pub saa_elevated: Tristate,
    #[serde(default)]
    pub hives: Tristate,
    #[serde(default)]
    pub triggers: Tristate,
    #[serde(default)]
    pub sensorineural_hearing_loss: Tristate,
    #[serde(default)]
    pub aseptic_meningitis: Tristate,
    #[serde(default)]
    pub skeletal_abnormalities: Tristate,
    #[serde(default)]
    pub eye_lesions: Tristate,
}

impl ClinicalSigns {
    pub fn get(&self, field: ClinicalField) -> Tristate {
        match field {
            ClinicalField::CrpElevated => self.crp_elevated,
            ClinicalField::SaaElevated => self.saa_elevated,
            ClinicalField::Hives => self.hives,
            ClinicalField::Triggers => self.triggers,
            ClinicalField::SensorineuralHearingLoss => self.sensorineural_hearing_loss,
            ClinicalField::AsepticMeningitis => self.aseptic_meningitis,
            ClinicalField::SkeletalAbnormalities => self.skeletal_abnormalities,
            ClinicalField::EyeLesions => self.eye_lesions,
        }
    }

    pub fn set(&mut self, field: ClinicalField, value: Tristate) {
        let slot = match field {
            ClinicalField::CrpElevated => &mut self.crp_elevated,
            ClinicalField::SaaElevated => &mut self.saa_elevated,
            ClinicalField::Hives => &mut self.hives,
            ClinicalField::Triggers => &mut self.triggers,
            ClinicalField::SensorineuralHearingLoss => &mut self.sensorineural_hearing_loss,
            ClinicalField::AsepticMeningitis => &mut self.aseptic_meningitis,
            ClinicalField::SkeletalAbnormalities => &mut self.skeletal_abnormalities,
            ClinicalField::EyeLesions => &mut self.eye_lesions,
        };
        *slot = value;
    }

    pub fn count_true(&self, fields: &[ClinicalField]) -> usize {
        fields.iter().filter(|f| self.get(**f).is_true()).count()
    }
}

/// What one chunk of a report says about the patient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRecord {
    #[serde(flatten)]
    pub signs: ClinicalSigns,
    #[serde(default)]
    pub nlrp3_mutations: Vec<String>,
}

impl PartialRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sign(mut self, field: ClinicalField, value: Tristate) -> Self {
        self.signs.set(field, value);
        self
    }

    #[must_use]
    pub fn with_mutation(mut self, mutation: impl Into<String>) -> Self {
        self.nlrp3_mutations.push(mutation.into());
        self
    }

    /// Reads the extraction schema out of an arbitrary JSON object.
    ///
    /// Returns `None` when `value` is not an object. Missing or malformed
    /// fields degrade to unknown / empty rather than failing the chunk.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;

        let mut signs = ClinicalSigns::default();
        for field in ClinicalField::ALL {
            signs.set(field, Tristate::from_json(object.get(field.key())));
        }

        let nlrp3_mutations = match object.get("nlrp3_mutations") {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(serde_json::Value::as_str)
                .map(String::from)
                .collect(),
            Some(serde_json::Value::String(single)) if !single.trim().is_empty() => {
                vec![single.clone()]
            }
            _ => Vec::new(),
        };

        Some(Self {
            signs,
            nlrp3_mutations,
        })
    }
}

/// Something the reviewer still has to answer before the record is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewItem {
    Sign(ClinicalField),
    Mutations,
}

impl ReviewItem {
    pub fn question(self) -> &'static str {
        match self {
            Self::Sign(field) => field.question(),
            Self::Mutations => "Is there any information on NLRP3 gene variants?",
        }
    }
}

/// The accumulated patient record for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRecord {
    #[serde(flatten)]
    pub signs: ClinicalSigns,
    #[serde(default)]
    pub nlrp3_mutations: Vec<String>,
    #[serde(default)]
    pub nlrp3_mutations_detailed: Vec<VariantEnrichment>,
}

impl FinalRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign(&self, field: ClinicalField) -> Tristate {
        self.signs.get(field)
    }

    pub fn set_sign(&mut self, field: ClinicalField, value: Tristate) {
        self.signs.set(field, value);
    }

    pub fn has_mutation(&self, mutation: &str) -> bool {
        self.nlrp3_mutations.iter().any(|m| m == mutation)
    }

    /// Appends `mutation` unless an identical string is already listed.
    pub fn push_mutation(&mut self, mutation: String) -> bool {
        if self.has_mutation(&mutation) {
            return false;
        }
        self.nlrp3_mutations.push(mutation);
        true
    }

    pub fn unresolved_fields(&self) -> Vec<ReviewItem> {
        let mut items: Vec<ReviewItem> = ClinicalField::ALL
            .into_iter()
            .filter(|f| !self.sign(*f).is_definite())
            .map(ReviewItem::Sign)
            .collect();

        if self.nlrp3_mutations.is_empty() {
            items.push(ReviewItem::Mutations);
        }

        items
    }

    pub fn enrich_with(&mut self, table: &ReferenceTable) {
        self.nlrp3_mutations_detailed = enrich(self.nlrp3_mutations.as_slice(), table);
    }

    /// Replaces the mutation list after a manual edit. Variants already in the
    /// list keep their annotation; only new ones are looked up in `table`.
    pub fn replace_mutations(&mut self, mutations: Vec<String>, table: &ReferenceTable) {
        let previous: Vec<(String, VariantEnrichment)> =
            if self.nlrp3_mutations_detailed.len() == self.nlrp3_mutations.len() {
                std::mem::take(&mut self.nlrp3_mutations)
                    .into_iter()
                    .zip(std::mem::take(&mut self.nlrp3_mutations_detailed))
                    .collect()
            } else {
                Vec::new()
            };

        self.nlrp3_mutations_detailed = mutations
            .iter()
            .map(|m| {
                previous
                    .iter()
                    .find(|(old, _)| old == m)
                    .map_or_else(|| enrich_one(m, table), |(_, detail)| detail.clone())
            })
            .collect();
        self.nlrp3_mutations = mutations;
    }
}

/// Splits a comma-separated list of variants as typed by a reviewer.
pub fn parse_mutation_list(input: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if !out.iter().any(|m| m == part) {
            out.push(part.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{ClassificationLabel, ReferenceRow};
    use serde_json::json;

    #[test]
    fn test_tristate_serialization() {
        assert_eq!(serde_json::to_value(Tristate::True).unwrap(), json!(true));
        assert_eq!(serde_json::to_value(Tristate::False).unwrap(), json!(false));
        assert_eq!(
            serde_json::to_value(Tristate::Unknown).unwrap(),
            json!("unknown")
        );

        let parsed: Tristate = serde_json::from_value(json!("UNKNOWN")).unwrap();
        assert_eq!(parsed, Tristate::Unknown);
        assert!(serde_json::from_value::<Tristate>(json!("maybe")).is_err());
    }

    #[test]
    fn test_tristate_from_json_is_strict_about_definite_values() {
        assert_eq!(Tristate::from_json(Some(&json!(true))), Tristate::True);
        assert_eq!(Tristate::from_json(Some(&json!(false))), Tristate::False);
        assert_eq!(Tristate::from_json(Some(&json!("true"))), Tristate::Unknown);
        assert_eq!(Tristate::from_json(Some(&json!(1))), Tristate::Unknown);
        assert_eq!(Tristate::from_json(Some(&json!(0))), Tristate::Unknown);
        assert_eq!(Tristate::from_json(None), Tristate::Unknown);
    }

    #[test]
    fn test_field_keys_round_trip() {
        for field in ClinicalField::ALL {
            assert_eq!(ClinicalField::from_key(field.key()), Some(field));
        }
        assert_eq!(ClinicalField::from_key(" HIVES "), Some(ClinicalField::Hives));
        assert_eq!(ClinicalField::from_key("fever"), None);
    }

    #[test]
    fn test_partial_from_json() {
        let value = json!({
            "crp_elevated": true,
            "saa_elevated": "unknown",
            "eye_lesions": false,
            "nlrp3_mutations": ["c.1322C>T", 42, "p.Ala439Val"]
        });

        let partial = PartialRecord::from_json(&value).unwrap();

        assert_eq!(partial.signs.crp_elevated, Tristate::True);
        assert_eq!(partial.signs.saa_elevated, Tristate::Unknown);
        assert_eq!(partial.signs.eye_lesions, Tristate::False);
        assert_eq!(partial.signs.hives, Tristate::Unknown);
        assert_eq!(partial.nlrp3_mutations, vec!["c.1322C>T", "p.Ala439Val"]);
    }

    #[test]
    fn test_partial_from_json_single_string_and_non_object() {
        let partial =
            PartialRecord::from_json(&json!({"nlrp3_mutations": "c.1A>G"})).unwrap();
        assert_eq!(partial.nlrp3_mutations, vec!["c.1A>G"]);

        assert!(PartialRecord::from_json(&json!(["c.1A>G"])).is_none());
        assert!(PartialRecord::from_json(&json!(null)).is_none());
    }

    #[test]
    fn test_final_record_json_shape() {
        let mut record = FinalRecord::new();
        record.set_sign(ClinicalField::CrpElevated, Tristate::True);
        record.push_mutation("c.1322C>T".into());

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["crp_elevated"], json!(true));
        assert_eq!(value["hives"], json!("unknown"));
        assert_eq!(value["nlrp3_mutations"], json!(["c.1322C>T"]));
        assert_eq!(value["nlrp3_mutations_detailed"], json!([]));

        let back: FinalRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_unresolved_fields() {
        let mut record = FinalRecord::new();
        assert_eq!(record.unresolved_fields().len(), 9);

        for field in ClinicalField::ALL {
            record.set_sign(field, Tristate::False);
        }
        record.set_sign(ClinicalField::Hives, Tristate::Unknown);

        assert_eq!(
            record.unresolved_fields(),
            vec![ReviewItem::Sign(ClinicalField::Hives), ReviewItem::Mutations]
        );

        record.push_mutation("c.1A>G".into());
        assert_eq!(
            record.unresolved_fields(),
            vec![ReviewItem::Sign(ClinicalField::Hives)]
        );
    }

    #[test]
    fn test_push_mutation_dedupes() {
        let mut record = FinalRecord::new();
        assert!(record.push_mutation("c.1A>G".into()));
        assert!(!record.push_mutation("c.1A>G".into()));
        assert!(record.push_mutation("C.1A>G".into()));
        assert_eq!(record.nlrp3_mutations.len(), 2);
    }

    #[test]
    fn test_replace_mutations_re_enriches() {
        let table = ReferenceTable::from_rows(vec![ReferenceRow::new(
            vec!["NM_001243133.2:c.1322C>T".into(), "Pathogenic".into()],
            "Pathogenic",
            "NM_001243133.2:c.1322C>T",
        )]);

        let mut record = FinalRecord::new();
        record.replace_mutations(parse_mutation_list("c.1322C>T, c.9G>A"), &table);

        assert_eq!(record.nlrp3_mutations_detailed.len(), 2);
        assert_eq!(record.nlrp3_mutations_detailed[0].classification, vec!["Pathogenic"]);
        assert_eq!(record.nlrp3_mutations_detailed[1].classification, vec!["unknown"]);
    }

    #[test]
    fn test_replace_mutations_keeps_existing_annotations() {
        let table = ReferenceTable::from_rows(vec![ReferenceRow::new(
            vec!["NM_001243133.2:c.1322C>T".into(), "Pathogenic".into()],
            "Pathogenic",
            "NM_001243133.2:c.1322C>T",
        )]);
        let mut record = FinalRecord::new();
        record.replace_mutations(parse_mutation_list("c.1322C>T, c.9G>A"), &table);
        record.nlrp3_mutations_detailed[1].override_classification(ClassificationLabel::Vus);

        record.replace_mutations(
            parse_mutation_list("c.9G>A, c.1322C>T, p.Ala441Val"),
            &ReferenceTable::new(),
        );

        assert_eq!(record.nlrp3_mutations, vec!["c.9G>A", "c.1322C>T", "p.Ala441Val"]);
        let classes: Vec<&str> = record
            .nlrp3_mutations_detailed
            .iter()
            .map(VariantEnrichment::primary_classification)
            .collect();
        assert_eq!(classes, vec!["VUS", "Pathogenic", "unknown"]);
        assert_eq!(record.nlrp3_mutations_detailed[2].variant, "A441V");
    }

    #[test]
    fn test_parse_mutation_list() {
        assert_eq!(
            parse_mutation_list(" c.1A>G ,, c.2C>T, c.1A>G "),
            vec!["c.1A>G", "c.2C>T"]
        );
        assert!(parse_mutation_list(" , ").is_empty());
    }
}
