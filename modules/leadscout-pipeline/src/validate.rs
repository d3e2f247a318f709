//! Deterministic scoring of extracted fields against per-profile rubrics.
//!
//! The rubrics are pure functions over the extracted JSON. They never call a
//! model; their score decides whether an extraction attempt is accepted or
//! the extractor retries with a remediation prompt.

use serde_json::{Map, Value};

use crate::profiles::{ProfileDefinition, Rubric};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldValidation {
    pub score: u32,
    /// Percent of the profile's required fields that carry a usable value.
    pub completeness: f64,
    pub missing_fields: Vec<String>,
    pub is_valid: bool,
}

/// Score extracted fields under the profile's rubric.
pub fn validate(fields: &Map<String, Value>, profile: &ProfileDefinition) -> FieldValidation {
    let score = match profile.rubric {
        Rubric::Software => score_software(fields),
        Rubric::Iso => score_iso(fields),
        Rubric::Pharma => score_pharma(fields),
        Rubric::Telemedicine => score_telemedicine(fields),
        Rubric::Edtech => score_edtech(fields),
    };

    let mut missing_fields = Vec::new();
    let mut filled = 0usize;
    for &name in profile.required_fields {
        if field_is_filled(fields.get(name)) {
            filled += 1;
        } else {
            missing_fields.push(name.to_string());
        }
    }
    let completeness = if profile.required_fields.is_empty() {
        100.0
    } else {
        filled as f64 / profile.required_fields.len() as f64 * 100.0
    };

    FieldValidation {
        score,
        completeness,
        missing_fields,
        is_valid: score >= profile.validity_threshold,
    }
}

fn field_is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(_) => true,
    }
}

fn str_field<'a>(fields: &'a Map<String, Value>, name: &str) -> &'a str {
    fields.get(name).and_then(Value::as_str).unwrap_or("")
}

fn list_len(fields: &Map<String, Value>, name: &str) -> usize {
    fields
        .get(name)
        .and_then(Value::as_array)
        .map(|a| a.len())
        .unwrap_or(0)
}

fn bool_field(fields: &Map<String, Value>, name: &str) -> bool {
    fields.get(name).and_then(Value::as_bool).unwrap_or(false)
}

fn score_software(fields: &Map<String, Value>) -> u32 {
    let mut score = 0;
    if str_field(fields, "company_description").trim().len() >= 10 {
        score += 25;
    }
    let model = str_field(fields, "business_model").to_lowercase();
    if !model.trim().is_empty() {
        score += 25;
        if ["product", "saas", "paas", "iaas", "hybrid"]
            .iter()
            .any(|m| model.contains(m))
        {
            score += 10;
        }
    }
    if !str_field(fields, "software_name").trim().is_empty() {
        score += 20;
    }
    if str_field(fields, "software_purpose").trim().len() >= 5 {
        score += 10;
    }
    if field_is_filled(fields.get("target_audience")) {
        score += 10;
    }
    score
}

fn score_iso(fields: &Map<String, Value>) -> u32 {
    let mut score = 0;
    let desc = str_field(fields, "company_description").trim();
    if (20..=500).contains(&desc.len()) {
        score += 30;
    }
    if list_len(fields, "fintech_services") >= 1 {
        score += 25;
    }
    if field_is_filled(fields.get("company_type_in_payments")) {
        score += 25;
    }
    if field_is_filled(fields.get("target_audience")) {
        score += 20;
    }
    score
}

fn score_pharma(fields: &Map<String, Value>) -> u32 {
    let mut score = 0;
    if !str_field(fields, "company_description").trim().is_empty() {
        score += 30;
    }
    if list_len(fields, "pharma_roles") >= 1 {
        score += 25;
    }
    if list_len(fields, "named_products") >= 1 {
        score += 20;
    }
    if list_len(fields, "services") >= 1 {
        score += 15;
    }
    score
}

fn score_telemedicine(fields: &Map<String, Value>) -> u32 {
    let mut score = 0;
    if str_field(fields, "company_description").trim().len() >= 10 {
        score += 25;
    }
    if list_len(fields, "products") >= 1 {
        score += 25;
    }
    if list_len(fields, "services") >= 1 {
        score += 20;
    }
    if list_len(fields, "medical_specialties") >= 1 {
        score += 10;
    }
    if field_is_filled(fields.get("target_audience")) {
        score += 10;
    }
    score
}

fn score_edtech(fields: &Map<String, Value>) -> u32 {
    let mut score = 0;
    if str_field(fields, "company_description").trim().len() >= 10 {
        score += 30;
    }
    let has_software = !str_field(fields, "software_name").trim().is_empty()
        || bool_field(fields, "has_login_button")
        || bool_field(fields, "has_pricing_page")
        || list_len(fields, "mentioned_products") >= 1;
    if has_software {
        score += 30;
    }
    let audience = str_field(fields, "target_audience").to_lowercase();
    if ["school", "teacher", "parent", "student", "education"]
        .iter()
        .any(|k| audience.contains(k))
    {
        score += 20;
    }
    let indicators = list_len(fields, "edtech_indicators") as u32;
    score += (indicators * 5).min(20);
    if str_field(fields, "company_type")
        .to_lowercase()
        .contains("edtech")
    {
        score += 25;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::profile;
    use serde_json::json;

    fn fields(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn software_full_extraction_is_valid() {
        let f = fields(json!({
            "company_description": "ACME builds project tracking software.",
            "business_model": "SaaS",
            "software_name": "AcmeTrack",
            "software_purpose": "Tracks engineering projects.",
            "target_audience": "General B2B",
        }));
        let v = validate(&f, profile("software").unwrap());
        assert_eq!(v.score, 100);
        assert!(v.is_valid);
        assert_eq!(v.completeness, 100.0);
        assert!(v.missing_fields.is_empty());
    }

    #[test]
    fn software_description_alone_clears_the_threshold() {
        let f = fields(json!({
            "company_description": "A consulting agency for retailers.",
            "business_model": null,
            "software_name": null,
            "software_purpose": null,
            "target_audience": null,
        }));
        let v = validate(&f, profile("software").unwrap());
        assert_eq!(v.score, 25);
        assert!(v.is_valid);
        assert_eq!(v.missing_fields.len(), 4);
    }

    #[test]
    fn iso_sparse_extraction_fails_validation() {
        let f = fields(json!({
            "company_description": "Short",
            "fintech_services": [],
            "company_type_in_payments": [],
            "target_audience": [],
        }));
        let v = validate(&f, profile("iso").unwrap());
        assert_eq!(v.score, 0);
        assert!(!v.is_valid);
        assert_eq!(v.completeness, 25.0);
    }

    #[test]
    fn iso_overlong_description_earns_nothing() {
        let f = fields(json!({
            "company_description": "x".repeat(600),
            "fintech_services": ["Payment Processing"],
            "company_type_in_payments": ["ISO/MSP"],
            "target_audience": ["Small Businesses (SMB)"],
        }));
        let v = validate(&f, profile("iso").unwrap());
        assert_eq!(v.score, 70);
        assert!(v.is_valid);
    }

    #[test]
    fn edtech_demands_broad_evidence() {
        let partial = fields(json!({
            "company_description": "A software company in Berlin.",
            "software_name": "ClassTool",
            "target_audience": "General B2B",
            "edtech_indicators": [],
            "company_type": "Other",
        }));
        let v = validate(&partial, profile("edtech").unwrap());
        assert_eq!(v.score, 60);
        assert!(!v.is_valid);

        let full = fields(json!({
            "company_description": "ClassTool is a gradebook for German schools.",
            "software_name": "ClassTool",
            "software_purpose": "Digital gradebook and timetable.",
            "target_audience": "Schools and teachers",
            "edtech_indicators": ["school", "gradebook", "timetable", "lms"],
            "company_type": "EdTech Product Company",
        }));
        let v = validate(&full, profile("edtech").unwrap());
        assert_eq!(v.score, 125);
        assert!(v.is_valid);
    }

    #[test]
    fn edtech_indicator_bonus_is_capped() {
        let f = fields(json!({
            "company_description": "",
            "edtech_indicators": ["a", "b", "c", "d", "e", "f", "g", "h"],
        }));
        let v = validate(&f, profile("edtech").unwrap());
        assert_eq!(v.score, 20);
    }

    #[test]
    fn pharma_roles_drive_validity() {
        let f = fields(json!({
            "company_description": "A CDMO offering GMP manufacturing.",
            "pharma_roles": ["CDMO"],
            "named_products": [],
            "services": ["Contract Manufacturing"],
        }));
        let v = validate(&f, profile("pharma").unwrap());
        assert_eq!(v.score, 70);
        assert!(v.is_valid);
        assert_eq!(v.missing_fields, vec!["named_products".to_string()]);
    }
}
