//! Clinical writing assist.
//!
//! Two entry points sit on top of an external text generator:
//! [`RecordDrafter`] proposes a diagnosis and treatment plan from patient
//! context, and [`TemplateRecommender`] picks the template that best fits a
//! symptom, dropping to [`KeywordScorer`] whenever the generator cannot help.
//! Neither ever returns an error to its caller.

pub mod client;
pub mod drafting;
pub mod keyword;
pub mod parser;
pub mod prompt;
pub mod recommend;
pub mod types;

pub use client::*;
pub use drafting::*;
pub use keyword::*;
pub use parser::*;
pub use recommend::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssistError {
    #[error("symptom information is empty, cannot generate suggestion.")]
    EmptySymptom,

    #[error("{0} is not configured, cannot call the language model.")]
    MissingConfig(&'static str),

    #[error("Text generator unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("{0}")]
    CallFailed(String),

    #[error("Provider returned error (status {status}): {body}")]
    ProviderStatus { status: u16, body: String },

    #[error("Provider returned no completion")]
    EmptyCompletion,
}

impl AssistError {
    /// True for failures that happened after a request was sent.
    pub fn is_call_failure(&self) -> bool {
        matches!(
            self,
            Self::CallFailed(_) | Self::ProviderStatus { .. } | Self::EmptyCompletion
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_names_the_item() {
        let err = AssistError::MissingConfig("LLM_MODEL or OPENAI_MODEL");
        assert!(err.to_string().starts_with("LLM_MODEL or OPENAI_MODEL"));
    }

    #[test]
    fn call_failure_classification() {
        assert!(AssistError::CallFailed("timeout".into()).is_call_failure());
        assert!(AssistError::EmptyCompletion.is_call_failure());
        assert!(AssistError::ProviderStatus { status: 401, body: String::new() }.is_call_failure());
        assert!(!AssistError::MissingConfig("LLM_BASE_URL").is_call_failure());
        assert!(!AssistError::ProviderUnavailable("tls".into()).is_call_failure());
    }
}
