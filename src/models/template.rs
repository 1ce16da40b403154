use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// A reusable symptom / diagnosis / treatment bundle.
///
/// `content` is kept exactly as stored. Use [`TemplateContent::parse`] to
/// read its fields.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_stored_content")]
    pub content: String,
    pub owner_id: i64,
    pub is_shared: bool,
    #[serde(with = "super::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "super::timestamp")]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub owner_id: i64,
    pub is_shared: bool,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct TemplateChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub is_shared: Option<bool>,
}

/// Structured view of a template's stored content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContent {
    pub symptom: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment_plan: Option<String>,
}

impl TemplateContent {
    /// Parse stored content. Returns `None` unless the text is a JSON object.
    ///
    /// Non-string field values are ignored rather than rejected.
    pub fn parse(stored: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(stored).ok()?;
        let object = value.as_object()?;
        let field = |key: &str| object.get(key).and_then(|v| v.as_str()).map(str::to_string);
        Some(Self {
            symptom: field("symptom"),
            diagnosis: field("diagnosis"),
            treatment_plan: field("treatment_plan"),
        })
    }

    pub fn symptom(&self) -> &str {
        self.symptom.as_deref().unwrap_or("")
    }

    pub fn diagnosis(&self) -> &str {
        self.diagnosis.as_deref().unwrap_or("")
    }

    pub fn treatment_plan(&self) -> &str {
        self.treatment_plan.as_deref().unwrap_or("")
    }
}

/// Stored content goes out as JSON when it parses, otherwise as the raw string.
fn serialize_stored_content<S: Serializer>(stored: &String, s: S) -> Result<S::Ok, S::Error> {
    match serde_json::from_str::<serde_json::Value>(stored) {
        Ok(value) => value.serialize(s),
        Err(_) => s.serialize_str(stored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;

    fn template_with(content: &str) -> Template {
        let ts = parse_timestamp("2025-01-01 08:00:00").unwrap();
        Template {
            id: 7,
            name: "Flu".into(),
            description: None,
            content: content.into(),
            owner_id: 1,
            is_shared: false,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn parse_reads_string_fields() {
        let content = TemplateContent::parse(
            r#"{"symptom":"fever","diagnosis":"influenza","treatment_plan":"rest"}"#,
        )
        .unwrap();
        assert_eq!(content.symptom(), "fever");
        assert_eq!(content.diagnosis(), "influenza");
        assert_eq!(content.treatment_plan(), "rest");
    }

    #[test]
    fn parse_defaults_missing_and_non_string_fields() {
        let content = TemplateContent::parse(r#"{"symptom":["a"],"diagnosis":"x"}"#).unwrap();
        assert_eq!(content.symptom(), "");
        assert_eq!(content.diagnosis(), "x");
        assert_eq!(content.treatment_plan(), "");
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(TemplateContent::parse("plain text").is_none());
        assert!(TemplateContent::parse("\"quoted\"").is_none());
        assert!(TemplateContent::parse("[1,2]").is_none());
    }

    #[test]
    fn serialized_content_is_json_when_valid() {
        let json = serde_json::to_value(template_with(r#"{"diagnosis":"x"}"#)).unwrap();
        assert_eq!(json["content"]["diagnosis"], "x");
        assert_eq!(json["created_at"], "2025-01-01 08:00:00");
    }

    #[test]
    fn serialized_content_is_raw_string_when_invalid() {
        let json = serde_json::to_value(template_with("not json")).unwrap();
        assert_eq!(json["content"], "not json");
    }
}
