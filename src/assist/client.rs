use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::types::GenerationParams;
use super::AssistError;
use crate::config::LlmConfig;

/// A single blocking completion against some text generator.
pub trait TextGenerator {
    fn complete(
        &self,
        system: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, AssistError>;
}

/// Hands out a ready generator, or explains why none is available.
pub trait GeneratorSource: Send + Sync {
    fn acquire(&self) -> Result<Box<dyn TextGenerator>, AssistError>;
}

/// OpenAI-compatible chat completion client.
pub struct ChatCompletionClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl ChatCompletionClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, AssistError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssistError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl TextGenerator for ChatCompletionClient {
    fn complete(
        &self,
        system: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, AssistError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AssistError::CallFailed(format!("cannot reach {}", self.base_url))
                } else if e.is_timeout() {
                    AssistError::CallFailed(format!(
                        "request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    AssistError::CallFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AssistError::ProviderStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| AssistError::CallFailed(format!("unreadable response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(AssistError::EmptyCompletion)?;
        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }
}

/// Builds a fresh [`ChatCompletionClient`] from configuration on every call.
#[derive(Debug, Clone)]
pub struct ConfiguredGenerator {
    config: LlmConfig,
}

impl ConfiguredGenerator {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }
}

impl GeneratorSource for ConfiguredGenerator {
    fn acquire(&self) -> Result<Box<dyn TextGenerator>, AssistError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AssistError::MissingConfig("LLM_API_KEY or OPENAI_API_KEY"))?;
        let base_url = self
            .config
            .base_url
            .as_deref()
            .ok_or(AssistError::MissingConfig("LLM_BASE_URL"))?;
        let model = self
            .config
            .model
            .as_deref()
            .ok_or(AssistError::MissingConfig("LLM_MODEL or OPENAI_MODEL"))?;

        let client = ChatCompletionClient::new(base_url, api_key, model, self.config.timeout)?;
        Ok(Box::new(client))
    }
}

/// Mock generator for testing. Returns a configurable reply and counts calls.
#[derive(Clone)]
pub struct MockGenerator {
    reply: Result<String, AssistError>,
    acquire_error: Option<AssistError>,
    calls: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl MockGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            acquire_error: None,
            calls: Arc::new(AtomicUsize::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Every `complete` call fails with `err`.
    pub fn failing(err: AssistError) -> Self {
        Self {
            reply: Err(err),
            ..Self::new("")
        }
    }

    /// `acquire` itself fails with `err`.
    pub fn unavailable(err: AssistError) -> Self {
        Self {
            acquire_error: Some(err),
            ..Self::new("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

impl TextGenerator for MockGenerator {
    fn complete(
        &self,
        _system: &str,
        prompt: &str,
        _params: GenerationParams,
    ) -> Result<String, AssistError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        self.reply.clone()
    }
}

impl GeneratorSource for MockGenerator {
    fn acquire(&self) -> Result<Box<dyn TextGenerator>, AssistError> {
        match &self.acquire_error {
            Some(err) => Err(err.clone()),
            None => Ok(Box::new(self.clone())),
        }
    }
}
