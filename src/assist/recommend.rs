use serde_json::Value;

use super::client::GeneratorSource;
use super::keyword::{KeywordScorer, FALLBACK_LIMIT};
use super::parser::{text_field, GeneratorOutput};
use super::prompt::{build_recommend_prompt, TemplateSummary, RECOMMEND_SYSTEM_PROMPT};
use super::types::{GenerationParams, Relevance, Suggestion};
use crate::models::Template;

/// Reason attached when the generator's pick cannot be matched.
pub const DEFAULT_REASON: &str = "AI recommendation";

/// Picks the template that best fits a symptom.
pub struct TemplateRecommender<'a> {
    source: &'a dyn GeneratorSource,
    language: &'a str,
}

impl<'a> TemplateRecommender<'a> {
    pub fn new(source: &'a dyn GeneratorSource, language: &'a str) -> Self {
        Self { source, language }
    }

    /// Recommend from `templates`, which the caller has already scoped.
    ///
    /// Returns at most one suggestion. When the generator is unavailable,
    /// fails, or answers with something other than a JSON object, the
    /// keyword scorer decides instead.
    pub fn recommend(&self, symptom: &str, templates: &[Template]) -> Vec<Suggestion> {
        if symptom.trim().is_empty() || templates.is_empty() {
            return Vec::new();
        }

        let generator = match self.source.acquire() {
            Ok(generator) => generator,
            Err(err) => {
                tracing::debug!(error = %err, "template recommendation using keyword scorer");
                return KeywordScorer::rank(symptom, templates, FALLBACK_LIMIT);
            }
        };

        let summaries: Vec<TemplateSummary> =
            templates.iter().map(TemplateSummary::from_template).collect();
        let prompt = build_recommend_prompt(symptom, &summaries, self.language);

        let text = match generator.complete(
            RECOMMEND_SYSTEM_PROMPT,
            &prompt,
            GenerationParams::RECOMMEND,
        ) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "template recommendation call failed, falling back");
                return KeywordScorer::rank(symptom, templates, FALLBACK_LIMIT);
            }
        };

        match GeneratorOutput::classify(&text) {
            GeneratorOutput::Parsed(map) => {
                let selected = map.get("selected_template_id").cloned().unwrap_or(Value::Null);
                vec![select_template(templates, &selected, text_field(&map, "reason"))]
            }
            GeneratorOutput::RawText(_) => {
                tracing::warn!("template recommendation reply was not JSON, falling back");
                KeywordScorer::rank(symptom, templates, FALLBACK_LIMIT)
            }
        }
    }
}

/// Resolve the generator's pick. An id that matches no candidate falls back
/// to the first one with [`DEFAULT_REASON`]. `templates` must be non-empty.
fn select_template(templates: &[Template], selected: &Value, reason: String) -> Suggestion {
    if let Some(template) = templates.iter().find(|t| Value::from(t.id) == *selected) {
        return Suggestion {
            id: template.id,
            name: template.name.clone(),
            relevance: Relevance::Reason(reason),
        };
    }

    tracing::debug!(%selected, "selected template id not among candidates");
    let first = &templates[0];
    Suggestion {
        id: first.id,
        name: first.name.clone(),
        relevance: Relevance::Reason(DEFAULT_REASON.to_string()),
    }
}
