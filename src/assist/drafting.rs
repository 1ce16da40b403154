use super::client::GeneratorSource;
use super::parser::{text_field, GeneratorOutput};
use super::prompt::{build_draft_prompt, DRAFT_SYSTEM_PROMPT};
use super::types::{DraftRequest, DraftResult, GenerationParams};
use super::AssistError;

/// Drafts a diagnosis and treatment plan from patient context.
pub struct RecordDrafter<'a> {
    source: &'a dyn GeneratorSource,
    language: &'a str,
}

impl<'a> RecordDrafter<'a> {
    pub fn new(source: &'a dyn GeneratorSource, language: &'a str) -> Self {
        Self { source, language }
    }

    /// Produce a draft. Failures are reported through `message`, never returned.
    pub fn draft(&self, request: &DraftRequest) -> DraftResult {
        if request.symptom.trim().is_empty() {
            return DraftResult::with_message(AssistError::EmptySymptom.to_string());
        }

        let generator = match self.source.acquire() {
            Ok(generator) => generator,
            Err(err) => {
                tracing::debug!(error = %err, "record draft skipped, generator unavailable");
                return DraftResult::with_message(err.to_string());
            }
        };

        let prompt = build_draft_prompt(request, self.language);
        match generator.complete(DRAFT_SYSTEM_PROMPT, &prompt, GenerationParams::DRAFT) {
            Ok(text) => draft_from_output(GeneratorOutput::classify(&text)),
            Err(err) => {
                tracing::warn!(error = %err, "record draft call failed");
                DraftResult::with_message(failure_message(&err))
            }
        }
    }
}

/// Map classified generator output to a draft.
///
/// A JSON object yields its two fields; anything else becomes the
/// treatment plan with an empty diagnosis.
pub fn draft_from_output(output: GeneratorOutput) -> DraftResult {
    match output {
        GeneratorOutput::Parsed(map) => DraftResult {
            diagnosis: text_field(&map, "diagnosis"),
            treatment_plan: text_field(&map, "treatment_plan"),
            message: String::new(),
        },
        GeneratorOutput::RawText(text) => DraftResult {
            diagnosis: String::new(),
            treatment_plan: text,
            message: String::new(),
        },
    }
}

fn failure_message(err: &AssistError) -> String {
    if err.is_call_failure() {
        format!("language model call failed: {err}")
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::client::MockGenerator;

    fn request(symptom: &str) -> DraftRequest {
        DraftRequest {
            symptom: symptom.into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_symptom_short_circuits() {
        let mock = MockGenerator::new(r#"{"diagnosis":"x","treatment_plan":"y"}"#);
        let result = RecordDrafter::new(&mock, "English").draft(&request("   "));
        assert_eq!(result.diagnosis, "");
        assert_eq!(result.treatment_plan, "");
        assert_eq!(
            result.message,
            "symptom information is empty, cannot generate suggestion."
        );
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn missing_config_is_reported_in_message() {
        let mock = MockGenerator::unavailable(AssistError::MissingConfig("LLM_BASE_URL"));
        let result = RecordDrafter::new(&mock, "English").draft(&request("fever"));
        assert_eq!(result.diagnosis, "");
        assert_eq!(result.treatment_plan, "");
        assert!(result.message.contains("LLM_BASE_URL"));
    }

    #[test]
    fn json_reply_fills_both_fields() {
        let mock = MockGenerator::new(
            r#"{"diagnosis": "  Acute bronchitis ", "treatment_plan": "Rest, fluids"}"#,
        );
        let result = RecordDrafter::new(&mock, "English").draft(&request("cough"));
        assert_eq!(
            result,
            DraftResult {
                diagnosis: "Acute bronchitis".into(),
                treatment_plan: "Rest, fluids".into(),
                message: String::new(),
            }
        );
        assert_eq!(mock.calls(), 1);
        assert!(mock.last_prompt().unwrap().contains("- Symptom: cough"));
    }

    #[test]
    fn fenced_json_reply_is_parsed() {
        let mock = MockGenerator::new("```json\n{\"diagnosis\":\"Flu\",\"treatment_plan\":\"Oseltamivir\"}\n```");
        let result = RecordDrafter::new(&mock, "English").draft(&request("fever"));
        assert_eq!(result.diagnosis, "Flu");
        assert_eq!(result.treatment_plan, "Oseltamivir");
    }

    #[test]
    fn missing_json_field_defaults_to_empty() {
        let mock = MockGenerator::new(r#"{"diagnosis": "Migraine"}"#);
        let result = RecordDrafter::new(&mock, "English").draft(&request("headache"));
        assert_eq!(result.diagnosis, "Migraine");
        assert_eq!(result.treatment_plan, "");
        assert_eq!(result.message, "");
    }

    #[test]
    fn prose_reply_becomes_treatment_plan() {
        let mock = MockGenerator::new("  Consider viral pharyngitis; supportive care.  ");
        let result = RecordDrafter::new(&mock, "English").draft(&request("sore throat"));
        assert_eq!(result.diagnosis, "");
        assert_eq!(result.treatment_plan, "Consider viral pharyngitis; supportive care.");
        assert_eq!(result.message, "");
    }

    #[test]
    fn call_failure_is_reported_not_raised() {
        let mock = MockGenerator::failing(AssistError::CallFailed("cannot reach http://llm".into()));
        let result = RecordDrafter::new(&mock, "English").draft(&request("fever"));
        assert_eq!(result.diagnosis, "");
        assert_eq!(result.treatment_plan, "");
        assert!(result.message.starts_with("language model call failed"));
        assert!(result.message.contains("cannot reach"));
    }

    #[test]
    fn provider_status_is_call_failure() {
        let mock = MockGenerator::failing(AssistError::ProviderStatus {
            status: 401,
            body: "bad key".into(),
        });
        let result = RecordDrafter::new(&mock, "English").draft(&request("fever"));
        assert!(result.message.starts_with("language model call failed"));
        assert!(result.message.contains("401"));
    }

    #[test]
    fn unreachable_provider_reports_call_failure() {
        let config = crate::config::LlmConfig::new(
            Some("http://127.0.0.1:9".into()),
            Some("sk-test".into()),
            Some("clinical".into()),
        )
        .with_timeout(std::time::Duration::from_secs(2));
        let source = crate::assist::client::ConfiguredGenerator::new(config);
        let result = RecordDrafter::new(&source, "English").draft(&request("fever"));
        assert_eq!(result.diagnosis, "");
        assert_eq!(result.treatment_plan, "");
        assert!(result.message.starts_with("language model call failed"));
    }

    #[test]
    fn empty_reply_yields_all_empty() {
        let mock = MockGenerator::new("");
        let result = RecordDrafter::new(&mock, "English").draft(&request("fever"));
        assert_eq!(result, DraftResult::default());
    }
}
