use super::types::{Relevance, Suggestion};
use crate::models::{Template, TemplateContent};

/// Cutoff when the scorer stands in for a failed generator.
pub const FALLBACK_LIMIT: usize = 1;

/// Cutoff for the stand-alone keyword recommendation mode.
pub const KEYWORD_MODE_LIMIT: usize = 5;

/// Deterministic keyword-overlap ranking of templates.
pub struct KeywordScorer;

impl KeywordScorer {
    /// Rank `templates` against `symptom`, best first, at most `limit` entries.
    ///
    /// Zero scores are dropped and ties keep their input order.
    pub fn rank(symptom: &str, templates: &[Template], limit: usize) -> Vec<Suggestion> {
        let query = symptom.trim().to_lowercase();
        if query.is_empty() || templates.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<Suggestion> = templates
            .iter()
            .filter_map(|template| {
                let block = searchable_block(template);
                if block.trim().is_empty() {
                    return None;
                }
                let score = score_block(&query, &block);
                (score > 0).then(|| Suggestion {
                    id: template.id,
                    name: template.name.clone(),
                    relevance: Relevance::Score(score),
                })
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| score_of(b).cmp(&score_of(a)));
        scored.truncate(limit);
        scored
    }
}

/// Lowercased name, symptom, diagnosis and treatment plan, one per line.
/// Content that is not a JSON object is searched as the symptom.
fn searchable_block(template: &Template) -> String {
    let content = TemplateContent::parse(&template.content).unwrap_or_else(|| TemplateContent {
        symptom: Some(template.content.clone()),
        ..TemplateContent::default()
    });
    [
        template.name.as_str(),
        content.symptom(),
        content.diagnosis(),
        content.treatment_plan(),
    ]
    .join("\n")
    .to_lowercase()
}

/// Whole-query occurrences plus one point per query token present in the block.
fn score_block(query: &str, block: &str) -> usize {
    let phrase_hits = block.matches(query).count();
    let token_hits = query
        .split_whitespace()
        .filter(|token| block.contains(token))
        .count();
    phrase_hits + token_hits
}

fn score_of(s: &Suggestion) -> usize {
    match s.relevance {
        Relevance::Score(score) => score,
        Relevance::Reason(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;

    fn template(id: i64, name: &str, content: &str) -> Template {
        let ts = parse_timestamp("2025-01-01 00:00:00").unwrap();
        Template {
            id,
            name: name.into(),
            description: None,
            content: content.into(),
            owner_id: 1,
            is_shared: false,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn ids(suggestions: &[Suggestion]) -> Vec<i64> {
        suggestions.iter().map(|s| s.id).collect()
    }

    #[test]
    fn fever_cough_ranks_respiratory_template_first() {
        let templates = vec![
            template(1, "Respiratory", r#"{"symptom":"fever and cough","diagnosis":"URTI"}"#),
            template(2, "Neuro", r#"{"symptom":"headache","diagnosis":"migraine"}"#),
        ];
        let ranked = KeywordScorer::rank("fever cough", &templates, KEYWORD_MODE_LIMIT);
        assert_eq!(ids(&ranked), vec![1]);
        // "fever cough" never appears whole; each token once
        assert_eq!(ranked[0].relevance, Relevance::Score(2));
    }

    #[test]
    fn whole_phrase_occurrences_add_to_token_hits() {
        let templates = vec![template(
            1,
            "Cough",
            r#"{"symptom":"dry cough","diagnosis":"dry cough, likely viral"}"#,
        )];
        let ranked = KeywordScorer::rank("Dry Cough", &templates, 1);
        // 2 phrase hits + "dry" + "cough"
        assert_eq!(ranked[0].relevance, Relevance::Score(4));
    }

    #[test]
    fn repeated_query_token_counts_each_time() {
        let templates = vec![template(1, "Pain", r#"{"symptom":"pain"}"#)];
        let ranked = KeywordScorer::rank("pain pain", &templates, 1);
        assert_eq!(ranked[0].relevance, Relevance::Score(2));
    }

    #[test]
    fn zero_scores_are_dropped() {
        let templates = vec![template(1, "Rash", r#"{"symptom":"itchy rash"}"#)];
        assert!(KeywordScorer::rank("fever", &templates, 5).is_empty());
    }

    #[test]
    fn ties_keep_input_order_and_limit_applies() {
        let templates = vec![
            template(5, "A", r#"{"symptom":"fever"}"#),
            template(3, "B", r#"{"symptom":"fever"}"#),
            template(9, "C", r#"{"symptom":"fever fever"}"#),
        ];
        let ranked = KeywordScorer::rank("fever", &templates, 5);
        assert_eq!(ids(&ranked), vec![9, 5, 3]);
        assert_eq!(ids(&KeywordScorer::rank("fever", &templates, 2)), vec![9, 5]);
        assert_eq!(ids(&KeywordScorer::rank("fever", &templates, FALLBACK_LIMIT)), vec![9]);
    }

    #[test]
    fn unparseable_content_is_searched_as_symptom() {
        let templates = vec![template(4, "Legacy", "patient reports abdominal pain")];
        let ranked = KeywordScorer::rank("abdominal", &templates, 1);
        assert_eq!(ids(&ranked), vec![4]);
    }

    #[test]
    fn name_is_searched() {
        let templates = vec![template(6, "Asthma follow-up", r#"{}"#)];
        assert_eq!(ids(&KeywordScorer::rank("asthma", &templates, 1)), vec![6]);
    }

    #[test]
    fn blank_inputs_yield_nothing() {
        let templates = vec![template(1, "Flu", r#"{"symptom":"fever"}"#)];
        assert!(KeywordScorer::rank("   ", &templates, 5).is_empty());
        assert!(KeywordScorer::rank("fever", &[], 5).is_empty());
    }

    #[test]
    fn blank_block_is_skipped() {
        let templates = vec![template(1, "  ", r#"{"symptom":"  "}"#)];
        assert!(KeywordScorer::rank("a", &templates, 5).is_empty());
    }

    #[test]
    fn ranking_is_deterministic() {
        let templates = vec![
            template(1, "Flu", r#"{"symptom":"fever cough"}"#),
            template(2, "Cold", r#"{"symptom":"cough"}"#),
        ];
        let first = KeywordScorer::rank("fever cough", &templates, 5);
        let second = KeywordScorer::rank("fever cough", &templates, 5);
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec![1, 2]);
    }
}
