use std::fmt::Write;

use super::types::DraftRequest;
use crate::models::{Template, TemplateContent};

pub const DRAFT_SYSTEM_PROMPT: &str = "You are a careful, professional clinical assistant.";

pub const RECOMMEND_SYSTEM_PROMPT: &str = "You are a medical assistant skilled at analysing \
     symptoms and matching them to the most suitable medical record template.";

const NOT_PROVIDED: &str = "not provided";
const UNNAMED_TEMPLATE: &str = "unnamed template";
const SUMMARY_FIELD_CHARS: usize = 100;

/// Build the drafting instruction for one patient.
pub fn build_draft_prompt(request: &DraftRequest, language: &str) -> String {
    let or_missing = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(NOT_PROVIDED)
            .to_string()
    };
    let age = request
        .age
        .map(|a| a.to_string())
        .unwrap_or_else(|| NOT_PROVIDED.to_string());

    format!(
        r#"You are a senior clinical assistant. Based on the information below, propose a diagnosis and a treatment plan.

Output requirements:
1. Respond in {language}.
2. Return a JSON object with exactly two fields: "diagnosis" (suggested diagnosis) and "treatment_plan" (suggested treatment plan). No other fields.
3. Be professional, clear and clinically actionable.

Patient information:
- Symptom: {symptom}
- Medical history: {history}
- Allergy history: {allergy}
- Age: {age}
- Gender: {gender}
"#,
        symptom = request.symptom.trim(),
        history = or_missing(&request.medical_history),
        allergy = or_missing(&request.allergy_history),
        gender = or_missing(&request.gender),
    )
}

/// Short, bounded view of a template used inside the recommendation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub id: i64,
    pub name: String,
    pub symptom: String,
    pub diagnosis: String,
    pub treatment_plan: String,
}

impl TemplateSummary {
    /// Unparseable content summarises with empty fields.
    pub fn from_template(template: &Template) -> Self {
        let content = TemplateContent::parse(&template.content).unwrap_or_default();
        let name = template.name.trim();
        Self {
            id: template.id,
            name: if name.is_empty() {
                UNNAMED_TEMPLATE.to_string()
            } else {
                template.name.clone()
            },
            symptom: truncate_chars(content.symptom(), SUMMARY_FIELD_CHARS),
            diagnosis: truncate_chars(content.diagnosis(), SUMMARY_FIELD_CHARS),
            treatment_plan: truncate_chars(content.treatment_plan(), SUMMARY_FIELD_CHARS),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Build the template selection instruction.
pub fn build_recommend_prompt(symptom: &str, summaries: &[TemplateSummary], language: &str) -> String {
    let mut listing = String::new();
    for (i, t) in summaries.iter().enumerate() {
        let _ = writeln!(
            listing,
            "{}. template_id={}, name={}, symptom={}, diagnosis={}, treatment_plan={}",
            i + 1,
            t.id,
            t.name,
            t.symptom,
            t.diagnosis,
            t.treatment_plan
        );
    }

    format!(
        r#"You are an experienced clinical assistant. Based on the patient's symptoms, choose the single most relevant template from the available medical record templates below.

Patient symptoms:
{symptom}

Available templates:
{listing}
Requirements:
1. You must choose exactly one template from the list above.
2. Even if no template matches perfectly, choose the most relevant one.
3. Return JSON only: {{"selected_template_id": <template id>, "reason": "<why it fits, in {language}>"}}
4. Do not return anything else.
"#,
        symptom = symptom.trim(),
    )
}
