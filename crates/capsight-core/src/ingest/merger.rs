use crate::record::{ClinicalField, FinalRecord, PartialRecord};

/// Folds one chunk's findings into the running record.
///
/// Definite values overwrite, unknown never does. Mutations are appended in
/// first-seen order without duplicates.
#[must_use]
pub fn merge_one(mut record: FinalRecord, partial: PartialRecord) -> FinalRecord {
    for field in ClinicalField::ALL {
        let value = partial.signs.get(field);
        if value.is_definite() {
            record.set_sign(field, value);
        }
    }

    for mutation in partial.nlrp3_mutations {
        record.push_mutation(mutation);
    }

    record
}

pub fn merge<I>(partials: I) -> FinalRecord
where
    I: IntoIterator<Item = PartialRecord>,
{
    partials.into_iter().fold(FinalRecord::default(), merge_one)
}

/// Appends regex-sweep findings the model did not report. Returns how many
/// were new.
pub fn absorb_literal<I>(record: &mut FinalRecord, found: I) -> usize
where
    I: IntoIterator<Item = String>,
{
    found
        .into_iter()
        .filter(|mutation| record.push_mutation(mutation.clone()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Tristate;

    fn partial(field: ClinicalField, value: Tristate) -> PartialRecord {
        PartialRecord::new().with_sign(field, value)
    }

    #[test]
    fn test_empty_merge_is_all_unknown() {
        let record = merge(Vec::<PartialRecord>::new());

        assert!(ClinicalField::ALL
            .into_iter()
            .all(|f| record.sign(f) == Tristate::Unknown));
        assert!(record.nlrp3_mutations.is_empty());
        assert!(record.nlrp3_mutations_detailed.is_empty());
    }

    #[test]
    fn test_unknown_never_overwrites() {
        let record = merge(vec![
            partial(ClinicalField::Hives, Tristate::True),
            partial(ClinicalField::Hives, Tristate::Unknown),
            PartialRecord::new(),
        ]);

        assert_eq!(record.sign(ClinicalField::Hives), Tristate::True);
    }

    #[test]
    fn test_last_definite_wins() {
        let record = merge(vec![
            partial(ClinicalField::CrpElevated, Tristate::True),
            partial(ClinicalField::CrpElevated, Tristate::Unknown),
            partial(ClinicalField::CrpElevated, Tristate::False),
        ]);

        assert_eq!(record.sign(ClinicalField::CrpElevated), Tristate::False);
    }

    #[test]
    fn test_fields_merge_independently() {
        let record = merge(vec![
            partial(ClinicalField::SaaElevated, Tristate::True),
            partial(ClinicalField::EyeLesions, Tristate::False),
        ]);

        assert_eq!(record.sign(ClinicalField::SaaElevated), Tristate::True);
        assert_eq!(record.sign(ClinicalField::EyeLesions), Tristate::False);
        assert_eq!(record.sign(ClinicalField::Triggers), Tristate::Unknown);
    }

    #[test]
    fn test_mutation_dedup_keeps_first_seen_order() {
        let record = merge(vec![
            PartialRecord::new().with_mutation("c.1A>G"),
            PartialRecord::new()
                .with_mutation("c.1A>G")
                .with_mutation("c.2C>T"),
        ]);

        assert_eq!(record.nlrp3_mutations, vec!["c.1A>G", "c.2C>T"]);
    }

    #[test]
    fn test_absorb_literal_appends_after_model_findings() {
        let mut record = merge(vec![PartialRecord::new().with_mutation("c.2C>T")]);

        let added = absorb_literal(
            &mut record,
            vec!["c.1A>G".to_string(), "c.2C>T".to_string()],
        );

        assert_eq!(added, 1);
        assert_eq!(record.nlrp3_mutations, vec!["c.2C>T", "c.1A>G"]);
    }

    #[test]
    fn test_absorb_literal_is_exact_match() {
        let mut record = merge(vec![PartialRecord::new().with_mutation("c.1322C>T")]);

        absorb_literal(&mut record, vec!["C.1322c>t".to_string()]);

        assert_eq!(record.nlrp3_mutations, vec!["c.1322C>T", "C.1322c>t"]);
    }
}
