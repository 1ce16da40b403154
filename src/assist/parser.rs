use serde_json::{Map, Value};

/// What the generator handed back, classified once.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorOutput {
    /// The text was a JSON object.
    Parsed(Map<String, Value>),
    /// Anything else, trimmed.
    RawText(String),
}

impl GeneratorOutput {
    /// Classify raw completion text. Never fails.
    ///
    /// A surrounding Markdown code fence (```json ... ```) is removed before
    /// parsing; JSON that is not an object counts as raw text.
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        match serde_json::from_str::<Value>(strip_code_fence(trimmed)) {
            Ok(Value::Object(map)) => Self::Parsed(map),
            _ => Self::RawText(trimmed.to_string()),
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

/// Read a text field from a parsed object.
///
/// Strings are trimmed, null or missing yields "", any other value is
/// rendered as its JSON text.
pub fn text_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_is_parsed() {
        let out = GeneratorOutput::classify(r#"  {"diagnosis": "flu"} "#);
        match out {
            GeneratorOutput::Parsed(map) => assert_eq!(map["diagnosis"], "flu"),
            other => panic!("expected Parsed, got {other:?}"),
        }
    }

    #[test]
    fn fenced_object_is_parsed() {
        let raw = "```json\n{\"diagnosis\": \"flu\", \"treatment_plan\": \"rest\"}\n```";
        assert!(matches!(GeneratorOutput::classify(raw), GeneratorOutput::Parsed(_)));

        let bare_fence = "```\n{\"a\": 1}\n```";
        assert!(matches!(GeneratorOutput::classify(bare_fence), GeneratorOutput::Parsed(_)));
    }

    #[test]
    fn prose_is_raw_text() {
        let out = GeneratorOutput::classify("  Likely a viral infection.  ");
        assert_eq!(out, GeneratorOutput::RawText("Likely a viral infection.".into()));
    }

    #[test]
    fn non_object_json_is_raw_text() {
        assert_eq!(
            GeneratorOutput::classify("[1, 2]"),
            GeneratorOutput::RawText("[1, 2]".into())
        );
        assert_eq!(
            GeneratorOutput::classify("\"just a string\""),
            GeneratorOutput::RawText("\"just a string\"".into())
        );
    }

    #[test]
    fn unterminated_fence_is_raw_text() {
        let raw = "```json\n{\"a\": 1}";
        assert_eq!(GeneratorOutput::classify(raw), GeneratorOutput::RawText(raw.into()));
    }

    #[test]
    fn empty_is_raw_text() {
        assert_eq!(GeneratorOutput::classify("   "), GeneratorOutput::RawText(String::new()));
    }

    #[test]
    fn text_field_rules() {
        let map = match GeneratorOutput::classify(
            r#"{"a": "  padded ", "b": null, "c": 42, "d": ["x"]}"#,
        ) {
            GeneratorOutput::Parsed(map) => map,
            other => panic!("expected Parsed, got {other:?}"),
        };
        assert_eq!(text_field(&map, "a"), "padded");
        assert_eq!(text_field(&map, "b"), "");
        assert_eq!(text_field(&map, "c"), "42");
        assert_eq!(text_field(&map, "d"), r#"["x"]"#);
        assert_eq!(text_field(&map, "missing"), "");
    }
}
