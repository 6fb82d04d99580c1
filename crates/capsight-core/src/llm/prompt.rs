use crate::record::ClinicalField;

const REPORT_PLACEHOLDER: &str = "{report_text}";

/// Extraction instructions sent with every chunk. Reports are usually written
/// in Russian; the schema keys stay in English.
pub const PROMPT_TEMPLATE: &str = r#"You are an expert in rheumatology and clinical genetics. You are given an excerpt of a patient's clinical report (usually in Russian). Decide whether the excerpt mentions signs of CAPS (Cryopyrin-Associated Periodic Syndromes) and related findings.

Return strictly one JSON object with these fields:
"crp_elevated" - true, false or "unknown": elevated C-reactive protein (CRP, С-реактивный белок);
"saa_elevated" - true, false or "unknown": elevated serum amyloid A (SAA, сывороточный амилоид А);
"hives" - true, false or "unknown": urticaria / urticaria-like rash (крапивница);
"triggers" - true, false or "unknown": attacks provoked by triggers such as cold or stress;
"sensorineural_hearing_loss" - true, false or "unknown": sensorineural hearing loss (нейросенсорная тугоухость);
"aseptic_meningitis" - true, false or "unknown": symptoms of aseptic meningitis;
"skeletal_abnormalities" - true, false or "unknown": skeletal abnormalities (epiphyseal overgrowth, frontal bossing, ...);
"eye_lesions" - true, false or "unknown": eye involvement (conjunctivitis, episcleritis, uveitis, ...);
"nlrp3_mutations" - list of NLRP3 gene variants exactly as written (for example c.1322C>T, p.Ala441Val, chr1:247588858C>T), or [] if none are mentioned.

{
 "crp_elevated": true|false|"unknown",
 "saa_elevated": true|false|"unknown",
 "hives": true|false|"unknown",
 "triggers": true|false|"unknown",
 "sensorineural_hearing_loss": true|false|"unknown",
 "aseptic_meningitis": true|false|"unknown",
 "skeletal_abnormalities": true|false|"unknown",
 "eye_lesions": true|false|"unknown",
 "nlrp3_mutations": ["string", ...] or []
}

Use "unknown" when the excerpt says nothing about a field. The JSON object must be the only output.
Text to analyze:
<<<
{report_text}
>>>
"#;

pub fn render_prompt(template: &str, chunk: &str) -> String {
    template.replace(REPORT_PLACEHOLDER, chunk)
}

/// Checks that a custom template still asks for every schema field and has a
/// slot for the report text.
pub fn missing_template_parts(template: &str) -> Vec<&'static str> {
    let mut missing: Vec<&'static str> = ClinicalField::ALL
        .into_iter()
        .map(ClinicalField::key)
        .chain(std::iter::once("nlrp3_mutations"))
        .filter(|key| !template.contains(key))
        .collect();
    if !template.contains(REPORT_PLACEHOLDER) {
        missing.push(REPORT_PLACEHOLDER);
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_inserts_chunk_once() {
        let prompt = render_prompt(PROMPT_TEMPLATE, "повышен CRP");

        assert!(prompt.contains("<<<\nповышен CRP\n>>>"));
        assert!(!prompt.contains(REPORT_PLACEHOLDER));
    }

    #[test]
    fn test_default_template_is_complete() {
        assert!(missing_template_parts(PROMPT_TEMPLATE).is_empty());
    }

    #[test]
    fn test_incomplete_template_reported() {
        let missing = missing_template_parts("crp_elevated only");

        assert!(missing.contains(&"hives"));
        assert!(missing.contains(&"nlrp3_mutations"));
        assert!(missing.contains(&REPORT_PLACEHOLDER));
        assert!(!missing.contains(&"crp_elevated"));
    }
}
