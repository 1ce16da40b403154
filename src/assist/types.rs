use serde::{Deserialize, Serialize};

/// Sampling settings for one generator call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    pub const DRAFT: Self = Self {
        max_tokens: 800,
        temperature: 0.4,
    };

    pub const RECOMMEND: Self = Self {
        max_tokens: 300,
        temperature: 0.3,
    };
}

/// Patient context handed to the drafter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftRequest {
    #[serde(default)]
    pub symptom: String,
    pub medical_history: Option<String>,
    pub allergy_history: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
}

/// Either the two text fields or `message` carries the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftResult {
    pub diagnosis: String,
    pub treatment_plan: String,
    pub message: String,
}

impl DraftResult {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// How a suggested template earned its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    /// Free-text justification from the generator.
    Reason(String),
    /// Keyword overlap score.
    Score(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub relevance: Relevance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_serializes_reason_inline() {
        let s = Suggestion {
            id: 3,
            name: "Flu".into(),
            relevance: Relevance::Reason("matches fever".into()),
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json, serde_json::json!({"id": 3, "name": "Flu", "reason": "matches fever"}));
    }

    #[test]
    fn suggestion_serializes_score_inline() {
        let s = Suggestion {
            id: 1,
            name: "Cold".into(),
            relevance: Relevance::Score(4),
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "name": "Cold", "score": 4}));
    }

    #[test]
    fn draft_request_tolerates_missing_fields() {
        let req: DraftRequest = serde_json::from_str(r#"{"age": 30}"#).unwrap();
        assert_eq!(req.symptom, "");
        assert_eq!(req.age, Some(30));
        assert!(req.gender.is_none());
    }
}
