//! Compile-time registry of classification profiles.
//!
//! Each profile bundles the full per-vertical configuration: prompt pair,
//! field rubric threshold, pre-filter lexicon and rule, and the confidence
//! floor below which classification escalates to the strong model.

use crate::prompts;

/// How the keyword pre-filter treats a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefilterRule {
    /// Score positives against exclusions; ambiguous pages pass through.
    Standard,
    /// Require at least one positive hit AND at most one exclusion hit.
    StrictTwoSided,
    /// No lexicon; everything proceeds to extraction.
    PassThrough,
}

/// Which required-field rubric the validator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rubric {
    Software,
    Iso,
    Pharma,
    Telemedicine,
    Edtech,
}

#[derive(Debug)]
pub struct ProfileDefinition {
    pub id: &'static str,
    pub display_name: &'static str,
    pub extraction_prompt: &'static str,
    pub classification_prompt: &'static str,
    pub rubric: Rubric,
    pub required_fields: &'static [&'static str],
    /// Minimum rubric score for an extraction to count as valid.
    pub validity_threshold: u32,
    /// Classification confidence below this escalates to the strong tier.
    pub escalation_threshold: f64,
    pub prefilter_rule: PrefilterRule,
    pub positive_keywords: &'static [&'static str],
    pub keyword_weight: u32,
    /// Label written for a match; `None` means the label is derived from the
    /// reasoning text (edtech).
    pub match_label: Option<&'static str>,
}

static SOFTWARE: ProfileDefinition = ProfileDefinition {
    id: "software",
    display_name: "SaaS/PaaS/IaaS",
    extraction_prompt: prompts::EXTRACT_SOFTWARE,
    classification_prompt: prompts::CLASSIFY_SOFTWARE,
    rubric: Rubric::Software,
    required_fields: &[
        "company_description",
        "business_model",
        "software_name",
        "software_purpose",
        "target_audience",
    ],
    validity_threshold: 25,
    escalation_threshold: 50.0,
    prefilter_rule: PrefilterRule::Standard,
    positive_keywords: &[
        "saas",
        "software",
        "platform",
        "cloud",
        "app",
        "application",
        "pricing",
        "features",
        "sign in",
        "login",
        "try for free",
    ],
    keyword_weight: 10,
    match_label: Some("Software Lead"),
};

static ISO: ProfileDefinition = ProfileDefinition {
    id: "iso",
    display_name: "ISO/MSP",
    extraction_prompt: prompts::EXTRACT_ISO,
    classification_prompt: prompts::CLASSIFY_ISO,
    rubric: Rubric::Iso,
    required_fields: &[
        "company_description",
        "fintech_services",
        "company_type_in_payments",
        "target_audience",
    ],
    validity_threshold: 35,
    escalation_threshold: 50.0,
    prefilter_rule: PrefilterRule::Standard,
    positive_keywords: &[
        "payment",
        "merchant",
        "pos",
        "card",
        "transaction",
        "fintech",
        "financial",
        "banking",
        "credit",
        "processing",
        "gateway",
    ],
    keyword_weight: 12,
    match_label: Some("ISO/MSP Lead"),
};

static PHARMA: ProfileDefinition = ProfileDefinition {
    id: "pharma",
    display_name: "Pharma",
    extraction_prompt: prompts::EXTRACT_PHARMA,
    classification_prompt: prompts::CLASSIFY_PHARMA,
    rubric: Rubric::Pharma,
    required_fields: &[
        "company_description",
        "pharma_roles",
        "named_products",
        "services",
    ],
    validity_threshold: 35,
    escalation_threshold: 50.0,
    prefilter_rule: PrefilterRule::PassThrough,
    positive_keywords: &[],
    keyword_weight: 0,
    match_label: Some("Pharma Lead"),
};

static TELEMEDICINE: ProfileDefinition = ProfileDefinition {
    id: "telemedicine",
    display_name: "Telemedicine",
    extraction_prompt: prompts::EXTRACT_TELEMEDICINE,
    classification_prompt: prompts::CLASSIFY_TELEMEDICINE,
    rubric: Rubric::Telemedicine,
    required_fields: &[
        "company_description",
        "products",
        "services",
        "medical_specialties",
        "target_audience",
    ],
    validity_threshold: 25,
    escalation_threshold: 50.0,
    prefilter_rule: PrefilterRule::PassThrough,
    positive_keywords: &[],
    keyword_weight: 0,
    match_label: Some("Telemedicine Lead"),
};

static EDTECH: ProfileDefinition = ProfileDefinition {
    id: "edtech",
    display_name: "EdTech",
    extraction_prompt: prompts::EXTRACT_EDTECH,
    classification_prompt: prompts::CLASSIFY_EDTECH,
    rubric: Rubric::Edtech,
    required_fields: &[
        "company_description",
        "software_name",
        "software_purpose",
        "target_audience",
        "edtech_indicators",
        "company_type",
    ],
    validity_threshold: 70,
    escalation_threshold: 70.0,
    prefilter_rule: PrefilterRule::StrictTwoSided,
    positive_keywords: &[
        "school",
        "schools",
        "schule",
        "kindergarten",
        "kita",
        "k-12",
        "teacher",
        "parent",
        "student",
        "classbook",
        "gradebook",
        "timetable",
        "schedule",
        "lesson",
        "homework",
        "announcement",
        "sso",
        "single sign",
        "gdpr",
        "dsgvo",
        "microsoft 365",
        "google workspace",
        "learning experience platform",
        "lxp",
        "digital learning platform",
        "learning ecosystem",
        "online training platform",
        "educational platform",
        "learning portal",
        "learning management system",
        "lms",
        "student information system",
        "sis",
        "academic management system",
        "school management system",
        "education management system",
        "microlearning platform",
        "skills development platform",
        "knowledge management system",
        "kms",
        "assessment platform",
        "testing platform",
        "digital academy",
        "course management system",
        "cms",
        "virtual learning environment",
        "vle",
        "online learning platform",
        "e-learning platform",
        "elearning platform",
    ],
    keyword_weight: 20,
    match_label: None,
};

static PROFILES: &[&ProfileDefinition] = &[&SOFTWARE, &ISO, &PHARMA, &TELEMEDICINE, &EDTECH];

/// Look up a profile by id.
pub fn profile(id: &str) -> Option<&'static ProfileDefinition> {
    PROFILES.iter().copied().find(|p| p.id == id)
}

/// All registered profile ids, for CLI help and error messages.
pub fn known_ids() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_every_id() {
        for id in ["software", "iso", "pharma", "telemedicine", "edtech"] {
            let p = profile(id).unwrap();
            assert_eq!(p.id, id);
            assert!(p.extraction_prompt.contains("{content}"));
            assert!(p.classification_prompt.contains("{structured_summary}"));
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(profile("automotive").is_none());
    }

    #[test]
    fn passthrough_profiles_carry_no_lexicon() {
        for id in ["pharma", "telemedicine"] {
            let p = profile(id).unwrap();
            assert_eq!(p.prefilter_rule, PrefilterRule::PassThrough);
            assert!(p.positive_keywords.is_empty());
        }
    }

    #[test]
    fn edtech_uses_the_strict_gate() {
        let p = profile("edtech").unwrap();
        assert_eq!(p.prefilter_rule, PrefilterRule::StrictTwoSided);
        assert_eq!(p.validity_threshold, 70);
        assert_eq!(p.escalation_threshold, 70.0);
        assert!(p.match_label.is_none());
    }
}
