//! Manual corrections a reviewer applies to an analyzed record.

use crate::error::{Error, Result};
use crate::record::{parse_mutation_list, ClinicalField, FinalRecord, Tristate};
use crate::variant::{ClassificationLabel, ReferenceTable};

/// Parses a `field=value` answer such as `hives=true`.
pub fn parse_answer(answer: &str) -> Result<(ClinicalField, Tristate)> {
    let (key, value) = answer
        .split_once('=')
        .ok_or_else(|| Error::UnknownField(answer.to_string()))?;

    let field =
        ClinicalField::from_key(key).ok_or_else(|| Error::UnknownField(key.trim().to_string()))?;
    let value = Tristate::parse(value).ok_or_else(|| Error::InvalidSignValue {
        field: field.key().to_string(),
        value: value.trim().to_string(),
    })?;

    Ok((field, value))
}

pub fn apply_answers<'a, I>(record: &mut FinalRecord, answers: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut applied = 0;
    for answer in answers {
        let (field, value) = parse_answer(answer)?;
        record.set_sign(field, value);
        applied += 1;
    }
    Ok(applied)
}

/// Replaces the mutation list with a reviewer's comma-separated edit and
/// annotates the variants it adds.
pub fn apply_mutation_edit(record: &mut FinalRecord, edit: &str, table: &ReferenceTable) {
    record.replace_mutations(parse_mutation_list(edit), table);
}

pub fn parse_label(label: &str) -> Result<ClassificationLabel> {
    ClassificationLabel::parse(label).ok_or_else(|| Error::UnknownLabel(label.to_string()))
}

/// Overrides the classification of the annotated variant whose normalized
/// form equals `variant`. Returns whether a variant was found.
pub fn override_classification(
    record: &mut FinalRecord,
    variant: &str,
    label: ClassificationLabel,
) -> bool {
    let key = crate::variant::normalize_variant(variant);
    let mut found = false;
    for detail in record
        .nlrp3_mutations_detailed
        .iter_mut()
        .filter(|d| d.variant == key)
    {
        detail.override_classification(label);
        found = true;
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ReviewItem;

    fn table() -> ReferenceTable {
        ReferenceTable::from_csv_reader(
            "name,germline_classification\nNM_001243133.2:c.1322C>T,Pathogenic/Likely pathogenic\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(
            parse_answer("hives=true").unwrap(),
            (ClinicalField::Hives, Tristate::True)
        );
        assert_eq!(
            parse_answer(" Eye_Lesions = no ").unwrap(),
            (ClinicalField::EyeLesions, Tristate::False)
        );
    }

    #[test]
    fn test_parse_answer_errors() {
        assert!(matches!(parse_answer("hives"), Err(Error::UnknownField(_))));
        assert!(matches!(
            parse_answer("fever=true"),
            Err(Error::UnknownField(key)) if key == "fever"
        ));
        assert!(matches!(
            parse_answer("hives=maybe"),
            Err(Error::InvalidSignValue { value, .. }) if value == "maybe"
        ));
    }

    #[test]
    fn test_answers_resolve_review_items() {
        let mut record = FinalRecord::new();
        assert_eq!(record.unresolved_fields().len(), 9);

        let applied = apply_answers(&mut record, ["crp_elevated=yes", "hives=false"]).unwrap();

        assert_eq!(applied, 2);
        let unresolved = record.unresolved_fields();
        assert!(!unresolved.contains(&ReviewItem::Sign(ClinicalField::CrpElevated)));
        assert!(unresolved.contains(&ReviewItem::Sign(ClinicalField::SaaElevated)));
        assert!(unresolved.contains(&ReviewItem::Mutations));
    }

    #[test]
    fn test_mutation_edit_reenriches() {
        let table = table();
        let mut record = FinalRecord::new();

        apply_mutation_edit(&mut record, "c.1322C>T, xyz, c.1322C>T", &table);

        assert_eq!(record.nlrp3_mutations, vec!["c.1322C>T", "xyz"]);
        assert_eq!(record.nlrp3_mutations_detailed.len(), 2);
        assert_eq!(
            record.nlrp3_mutations_detailed[0].primary_classification(),
            "Pathogenic/Likely pathogenic"
        );
        assert!(record.nlrp3_mutations_detailed[1].is_unknown());
    }

    #[test]
    fn test_override_classification() {
        let table = table();
        let mut record = FinalRecord::new();
        apply_mutation_edit(&mut record, "p.Ala441Val", &table);

        let label = parse_label("VUS").unwrap();
        assert!(override_classification(&mut record, "p.Ala441Val", label));
        assert!(!override_classification(&mut record, "c.1A>G", label));

        assert_eq!(record.nlrp3_mutations_detailed[0].classification, vec!["VUS"]);
        assert!(matches!(parse_label("vus"), Err(Error::UnknownLabel(_))));
    }
}
