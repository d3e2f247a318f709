//! Prompt templates, two per profile.
//!
//! Extraction templates take the page text via the `{content}` placeholder;
//! classification templates take the extracted-facts JSON via
//! `{structured_summary}`. Field names in the extraction templates are load
//! bearing: the field validator scores exactly these keys.

/// Bound on page text substituted into an extraction template. The fetcher
/// already caps at 6000 chars; this trims further to leave prompt headroom.
pub const MAX_PROMPT_CONTENT: usize = 5000;

pub fn render_extraction(template: &str, content: &str) -> String {
    template.replace("{content}", content)
}

pub fn render_classification(template: &str, facts_json: &str) -> String {
    template.replace("{structured_summary}", facts_json)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

pub const EXTRACT_SOFTWARE: &str = r#"You are a data extraction bot. Analyze the website content and extract key business details into JSON. Be objective; do not make subjective judgments.

**Crucial rule: you MUST always return a valid JSON object.** If a field cannot be determined, return null for strings, false for booleans, [] for lists.

Fill out the following fields:
- "company_description": A one-sentence summary of what the company does.
- "business_model": The primary business model. Choose one: ["Product", "Service (Consulting/Outsourcing/Agency)", "Hybrid (Product+Service)", "SaaS", "PaaS", "IaaS", "Other"].
- "software_name": The name of their main software product, if any.
- "software_purpose": A brief, one-sentence description of what their main software product is for, if any.
- "mentioned_products": A list of product names mentioned on the page, if any.
- "has_login_button": true/false — infer from words like "Login", "Sign in", "Sign into".
- "has_pricing_page": true/false — infer from words like "Pricing", "Plans", "Try for free".
- "target_audience": Who does the company primarily sell to? (e.g., "Schools", "Banks", "General B2B", "Patients").

Your output MUST be only the valid JSON object.

**Content:**
{content}
"#;

pub const EXTRACT_ISO: &str = r#"You are a data analyst specializing in the financial technology (fintech) and payments industry. Analyze the website content and extract key business details into JSON. Be objective; do not make subjective judgments.

**Crucial rule: you MUST always return a valid JSON object.** If a field cannot be determined, return "" for descriptions or [] for lists.

Fill out the following fields:
- "company_description": A brief, one or two-sentence summary of what the company does in the payments or fintech space.
- "fintech_services": A list of specific services offered. Examples: ["Payment Processing", "Merchant Accounts", "POS Solutions", "Fraud Detection", "Digital Banking", "Payment Gateway Services"].
- "company_type_in_payments": The company's primary role(s) in the payments ecosystem, as a list. Choose from: ["Processor", "ISO/MSP", "Merchant", "Fintech Platform", "Gateway", "Financial Institution", "Other"].
- "target_audience": The primary customers. Examples: ["Small Businesses (SMB)", "Large Enterprises", "E-commerce Stores", "Restaurants", "Direct to Consumer", "Banks"].

Your output MUST be only the valid JSON object. Do not add any text before or after it.

**Content:**
{content}
"#;

pub const EXTRACT_PHARMA: &str = r#"You are a data extraction bot for the pharma industry. Extract a normalized JSON summary.

CRITICAL: always return valid JSON. If unknown, use "" for strings and [] for lists.

Fields to extract:
- "company_description": 1-2 sentences about the company.
- "pharma_roles": list, any of ["CDMO", "CRO", "CMO", "API Manufacturer", "Drug Developer", "Pharma Distributor"].
- "named_products": list of drugs/APIs, if mentioned.
- "services": list, e.g. "Contract Manufacturing", "Clinical Trials", "Formulation", "GMP Manufacturing", "Distribution".

Only output the JSON.

Content:
{content}
"#;

pub const EXTRACT_TELEMEDICINE: &str = r#"You are a data extraction bot. Analyze the website content and extract key business details into JSON. Be objective; do not make subjective judgments.

**Crucial rule: you MUST always return a valid JSON object.** If a field cannot be determined, return "" for descriptions or [] for lists.

Fill out the following fields:
- "company_description": A brief, one or two-sentence summary of what the company does in the digital health space.
- "business_model": The primary business model, if stated (e.g. "SaaS", "Healthcare Provider").
- "products": A list of key products (e.g. "Virtual Care Platform", "Telehealth Mobile App", "Remote Monitoring Hardware").
- "services": A list of key services (e.g. "Online Doctor Consultations", "Virtual Therapy", "Digital Prescriptions", "24/7 Urgent Care").
- "medical_specialties": A list of medical fields served (e.g. "General Practice", "Mental Health", "Dermatology").
- "target_audience": A list of primary customers or users (e.g. "Patients", "Hospitals", "Clinics", "Insurance Companies", "Employers").

Your output MUST be only the valid JSON object. Do not add any text before or after it.

**Content:**
{content}
"#;

pub const EXTRACT_EDTECH: &str = r#"You are a data extraction bot. Analyze the website content and extract key business details into JSON. Be objective; do not make subjective judgments.

**Crucial rule: you MUST always return a valid JSON object.** If a field cannot be determined, return null for strings, false for booleans, [] for lists.

Fill out the following fields:
- "company_description": A one-sentence summary of what the company does.
- "business_model": The primary business model. Choose one: ["Product", "Service (Consulting/Outsourcing/Agency)", "Hybrid (Product+Service)", "SaaS", "PaaS", "IaaS", "Other"].
- "software_name": The name of their main software product, if any.
- "software_purpose": A brief, one-sentence description of what their main software product is for, if any.
- "mentioned_products": A list of product names mentioned on the page, if any.
- "has_login_button": true/false — infer from words like "Login", "Sign in", "Sign into".
- "has_pricing_page": true/false — infer from words like "Pricing", "Plans", "Try for free".
- "target_audience": Who does the company primarily sell to? (e.g., "Schools", "Teachers", "Parents", "General B2B").
- "edtech_indicators": A list of education-related keywords found (e.g., "school", "teacher", "parent", "student", "classroom").
- "company_type": The type of company. Choose one: ["EdTech Product Company", "EdTech Software Provider", "IT Services Company", "Other"].

When building "edtech_indicators", explicitly search (case-insensitive) for these EdTech system types and include matches:
- "Learning Experience Platform (LXP)", "LXP"
- "Digital Learning Platform", "Learning Ecosystem", "Learning Portal"
- "Online Training Platform", "Educational Platform", "Online Learning Platform"
- "Learning Management System (LMS)", "LMS"
- "Student Information System (SIS)", "SIS"
- "Academic Management System", "School Management System", "Education Management System"
- "Microlearning Platform", "Skills Development Platform"
- "Knowledge Management System (KMS)", "KMS"
- "Assessment Platform", "Testing Platform", "Digital Academy"
- "Course Management System (CMS)", "CMS"
- "Virtual Learning Environment (VLE)", "VLE"
- "E-learning Platform", "Elearning Platform"

Your output MUST be only the valid JSON object.

**Content:**
{content}
"#;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

pub const CLASSIFY_SOFTWARE: &str = r#"You are a business model analyst. Your sole task is to determine if a company offers a SaaS, PaaS, or IaaS product based on a structured summary from its website.

**Structured Summary:**
{structured_summary}

---
### Definitions:
- **SaaS (Software as a Service):** A ready-to-use software product accessed online via a subscription.
- **PaaS (Platform as a Service):** A platform for developers to build and run their own applications.
- **IaaS (Infrastructure as a Service):** Cloud computing infrastructure (servers, storage).

### Decision Logic (recall-first):

Classify as **Match** if ANY of the following are true:
1. "business_model" is one of ["SaaS", "PaaS", "IaaS", "Product", "Hybrid (Product+Service)"]
2. At least ONE strong product signal is present: has_login_button == true OR has_pricing_page == true OR "mentioned_products" has 1+ entries
3. The "software_purpose" clearly describes a hosted software/platform/API.

Classify as **No Match** only if:
- The company is clearly a pure services agency/consulting with no software product signals, OR
- The text is about a hardware manufacturer or physical goods e-commerce with no software product.

### Output Format
Your final output must be a single, valid JSON object.

{
  "reasoning": "A brief justification for your decision, stating the evidence found (e.g., 'Identified as SaaS due to login portal and pricing page').",
  "classification": "[Match or No Match]",
  "final_output": "[Use '+ Relevant - [Identified Model: SaaS/PaaS/IaaS]' for a match OR '- Not Relevant']"
}
"#;

pub const CLASSIFY_ISO: &str = r#"You are an aggressive, inclusive keyword-based analyst specializing in identifying Independent Sales Organizations (ISOs) and Merchant Service Providers (MSPs). Classify the company as Match or No Match based on the structured summary of its website. Prioritize finding potential matches.

**Structured Summary:**
{structured_summary}

---
### Keywords & phrases for a "Match":
- **Sales language:** merchant services, merchant accounts, payment solutions, get a free quote, compare rates, no hidden fees, switch and save
- **Partnerships & integration:** authorized reseller of, partnering with, integrations with, we work with, payment partner
- **Hardware/POS:** POS systems, point-of-sale, card terminals, card readers, payment devices
- **Business model:** "Service (Consulting/Outsourcing/Agency)", "Hybrid (Product+Service)" (from "business_model")
- **General payment terms:** payment processing, payment gateway, payment technology, credit card processing (in a reseller context)
- **Target audience:** "Restaurants", "Retailers", "Small Businesses", "E-commerce" (from "target_audience")

### Keywords for exclusion (No Match):
- API documentation, developers, our platform, our technology, our infrastructure
- SaaS platform, online signup (unless also a reseller)
- Fintech-as-a-Service

---
### Decision Logic:
1. **Prioritize Match:** the company is a **Match** if ANY keyword or phrase from the Match list is found in the structured summary.
2. **No Match rule:** the company is a **No Match** if NO Match keywords are found AND at least one exclusion keyword is present.
3. **Conflict resolution:** if keywords from both lists are found, classify as **Match**.

---
### Output Format
Your final output must be a single, valid JSON object. Do not add any text before or after it.

{
  "reasoning": "A brief justification citing the specific keyword(s) that led to the classification.",
  "classification": "[Match or No Match]",
  "final_output": "[Use '+ Relevant - ISO/MSP Lead' for a match OR '- Not Relevant']"
}
"#;

pub const CLASSIFY_PHARMA: &str = r#"You are a strict pharmaceutical industry analyst. Determine if a company is a pharma lead (drug developer/manufacturer/distributor, CRO/CDMO/CMO/API) based on a structured summary.

**Structured Summary:**
{structured_summary}

---
### Decision Logic (recall-first, deterministic):
Classify as **Match** if ANY of the following are true AND none of the hard exclusions apply:
1) Mentions being a: CDMO, CRO, CMO, API manufacturer/supplier
2) Core business: drug development, drug manufacturing (innovator or generic), pharma distribution/wholesale
3) Strong pharma product portfolio (named drugs, APIs) or GMP/clinical manufacturing

Hard exclusions (then classify as **No Match**): clinic/hospital/pharmacy (retail care provider), pure software/IT agency, recruiting agency, logistics carrier, medical devices-only, nutraceuticals-only (unless part of human pharma), government/charity/news portal.

---
### Output Format
Return a single valid JSON object, no extra text:
{
  "reasoning": "1-2 lines: which rule triggered (e.g., 'CDMO with GMP manufacturing').",
  "classification": "[Match or No Match]",
  "final_output": "[Use '+ Relevant - Pharma Lead' for Match OR '- Not Relevant']"
}
"#;

pub const CLASSIFY_TELEMEDICINE: &str = r#"You are a keyword-based analyst. Your sole task is to determine if a company is related to telemedicine, virtual health, or online doctor services based on a structured summary from its website.

**Structured Summary:**
{structured_summary}

---
### Keywords to search for:
telemedicine, telehealth, virtual care, virtual health, online doctor, remote consultation, patient portal, e-health, digital health platform

### Decision Logic:

A company is a **Match** if ANY of the following conditions are met:
1. The "company_description" contains any of the keywords.
2. The "products" list contains any of the keywords.
3. The "services" list contains any of the keywords.
4. The "target_audience" includes "Patients" AND the "business_model" is "SaaS" or "Healthcare Provider".

A company is a **No Match** if none of the above conditions are met.

### Output Format
Your final output must be a single, valid JSON object.

{
  "reasoning": "A brief justification for your decision, stating which keyword or rule was triggered.",
  "classification": "[Match or No Match]",
  "final_output": "[Use '+ Relevant - Telemedicine Lead' for a match OR '- Not Relevant']"
}
"#;

pub const CLASSIFY_EDTECH: &str = r#"You are a business model analyst. Your sole task is to determine if a company offers an EdTech platform for schools based on a structured summary from its website.

**Structured Summary:**
{structured_summary}

### Decision Logic (EdTech software focus):

Classify as **Match** if ALL of the following are true:
1. **Has software/platform:** has_login_button == true OR has_pricing_page == true OR software/products mentioned in "mentioned_products" OR "software_name" is not null
2. **Education connection:** "target_audience" mentions schools/teachers/parents/students/education OR "edtech_indicators" contains education keywords
3. **Company type:** "company_type" includes "EdTech" OR clear software development for the education sector

**Note:** business model (Product/SaaS/Service) is NOT a requirement — focus only on having software plus an education connection.

Classify as **No Match** if:
- No software/platform evidence OR no connection to the education market

### Output Format
Your final output must be a single, valid JSON object.

{
  "reasoning": "A brief justification for your decision, stating the evidence found.",
  "classification": "[Match or No Match]",
  "final_output": "[Use '+ Relevant - EdTech Platform' for a match OR '- Not Relevant']"
}
"#;
