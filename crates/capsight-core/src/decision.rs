use serde::Serialize;
use std::fmt;

use crate::record::{ClinicalField, FinalRecord};
use crate::variant::{ClassificationLabel, UNKNOWN_LABEL};

const GENETIC_TESTING_INFO: &str =
    "https://nczd.ru/price/laboratornaja-diagnostika/genetic/#:~:text=17.027.250";

/// Signs counted towards the urgent-testing rule.
pub const SUPPORTING_SIGNS: [ClinicalField; 5] = [
    ClinicalField::Hives,
    ClinicalField::Triggers,
    ClinicalField::SensorineuralHearingLoss,
    ClinicalField::AsepticMeningitis,
    ClinicalField::SkeletalAbnormalities,
];

/// Signs weighed together with the molecular findings.
pub const DIAGNOSTIC_SIGNS: [ClinicalField; 3] = [
    ClinicalField::Hives,
    ClinicalField::SensorineuralHearingLoss,
    ClinicalField::EyeLesions,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Assessment {
    /// Clinical picture together with a pathogenic or VUS variant.
    CapsConfirmed,
    /// Variants were reported but their significance does not settle it.
    Inconclusive,
    /// Elevated inflammatory markers with at least two supporting signs and
    /// no molecular data yet.
    UrgentGeneticTesting { supporting_signs: usize },
    NoUrgentTesting,
    InsufficientData,
}

/// Counts and flags the rules are evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Findings {
    pub inflammatory_marker: bool,
    pub supporting_signs: usize,
    pub diagnostic_signs: usize,
    pub has_mutation_info: bool,
    pub has_pathogenic: bool,
    pub has_vus: bool,
    pub all_unknown: bool,
}

impl Findings {
    pub fn from_record(record: &FinalRecord) -> Self {
        let classes: Vec<&str> = record
            .nlrp3_mutations_detailed
            .iter()
            .map(|v| v.primary_classification())
            .collect();
        let has_class = |label: ClassificationLabel| classes.iter().any(|c| *c == label.as_str());

        Self {
            inflammatory_marker: record.sign(ClinicalField::CrpElevated).is_true()
                || record.sign(ClinicalField::SaaElevated).is_true(),
            supporting_signs: record.signs.count_true(&SUPPORTING_SIGNS),
            diagnostic_signs: record.signs.count_true(&DIAGNOSTIC_SIGNS),
            has_mutation_info: !record.nlrp3_mutations.is_empty(),
            has_pathogenic: has_class(ClassificationLabel::PathogenicLikelyPathogenic),
            has_vus: has_class(ClassificationLabel::Vus),
            all_unknown: !classes.is_empty() && classes.iter().all(|c| *c == UNKNOWN_LABEL),
        }
    }
}

/// Applies the screening rules in priority order.
pub fn assess(record: &FinalRecord) -> Assessment {
    let f = Findings::from_record(record);

    if (f.has_pathogenic && f.diagnostic_signs >= 1) || (f.has_vus && f.diagnostic_signs >= 2) {
        Assessment::CapsConfirmed
    } else if (f.all_unknown && f.diagnostic_signs >= 1)
        || (f.has_mutation_info && f.diagnostic_signs >= 2)
    {
        Assessment::Inconclusive
    } else if f.inflammatory_marker && f.supporting_signs >= 2 && !f.has_mutation_info {
        Assessment::UrgentGeneticTesting {
            supporting_signs: f.supporting_signs,
        }
    } else if !f.has_mutation_info {
        Assessment::NoUrgentTesting
    } else {
        Assessment::InsufficientData
    }
}

impl Assessment {
    pub fn message(&self) -> String {
        match self {
            Self::CapsConfirmed => "Based on the clinical findings and the molecular genetic data, \
                 a diagnosis of CAPS can be made."
                .to_string(),
            Self::Inconclusive => format!(
                "An exact CAPS diagnosis is not possible.\n\n\
                 Repeat bioinformatic and functional analysis of the molecular genetic results \
                 is recommended, together with continued clinical follow-up. If prescribed by \
                 the physician, NLRP3 testing may be repeated.\n\nMore: {GENETIC_TESTING_INFO}"
            ),
            Self::UrgentGeneticTesting { supporting_signs } => format!(
                "Urgent molecular genetic testing of the NLRP3 gene is required! The patient has \
                 elevated C-reactive protein and/or serum amyloid A together with \
                 {supporting_signs} supporting diagnostic signs.\n\nMore: {GENETIC_TESTING_INFO}"
            ),
            Self::NoUrgentTesting => "The clinical data do not indicate a need for urgent \
                 molecular genetic testing of the NLRP3 gene."
                .to_string(),
            Self::InsufficientData => "Not enough data to form a conclusion.".to_string(),
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::UrgentGeneticTesting { .. })
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
