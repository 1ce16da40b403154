//! Runtime configuration, resolved once at startup.
//!
//! Nothing below the `run()` entry point reads process environment variables.
//! `AppConfig::from_env()` is the single place that touches the environment;
//! every service receives the resolved struct (or a piece of it) explicitly.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Clinirec";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
const DEFAULT_RESPONSE_LANGUAGE: &str = "English";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "clinirec_lib=info,clinirec=info,tower_http=warn"
}

/// Default database location: `<platform data dir>/clinirec/clinirec.db`.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clinirec")
        .join("clinirec.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Connection settings for the text-generation provider.
///
/// All three of `base_url`, `api_key` and `model` are required for the
/// generator path. They are kept optional here so a partially configured
/// deployment still starts; the assist layer reports what is missing.
#[derive(Clone)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout: Duration,
    /// Language the generator is asked to answer in.
    pub response_language: String,
}

// Manual impl keeps the key out of logs.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("response_language", &self.response_language)
            .finish()
    }
}

impl LlmConfig {
    pub fn new(
        base_url: Option<String>,
        api_key: Option<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            base_url: non_empty(base_url),
            api_key: non_empty(api_key),
            model: non_empty(model),
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            response_language: DEFAULT_RESPONSE_LANGUAGE.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_response_language(mut self, language: &str) -> Self {
        let language = language.trim();
        if !language.is_empty() {
            self.response_language = language.to_string();
        }
        self
    }

    /// True when all three required settings are present.
    pub fn is_complete(&self) -> bool {
        self.base_url.is_some() && self.api_key.is_some() && self.model.is_some()
    }
}

/// Core configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub token_ttl: chrono::Duration,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Build configuration from an explicit lookup function.
    ///
    /// `lookup` returns the raw value for a variable name. `from_env` passes
    /// `std::env::var`; tests pass a closure over a fixed map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_empty(lookup(name));

        let db_path = get("CLINIREC_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let addr_raw = get("CLINIREC_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let bind_addr = addr_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                name: "CLINIREC_ADDR",
                value: addr_raw.clone(),
            })?;

        let token_ttl_hours = parse_or(
            "CLINIREC_TOKEN_TTL_HOURS",
            get("CLINIREC_TOKEN_TTL_HOURS"),
            DEFAULT_TOKEN_TTL_HOURS,
        )?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "CLINIREC_TOKEN_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            });
        }

        let timeout_secs = parse_or(
            "LLM_TIMEOUT_SECS",
            get("LLM_TIMEOUT_SECS"),
            DEFAULT_LLM_TIMEOUT_SECS,
        )?;

        let llm = LlmConfig::new(
            get("LLM_BASE_URL"),
            get("LLM_API_KEY").or_else(|| get("OPENAI_API_KEY")),
            get("LLM_MODEL").or_else(|| get("OPENAI_MODEL")),
        )
        .with_timeout(Duration::from_secs(timeout_secs))
        .with_response_language(
            &get("LLM_RESPONSE_LANGUAGE").unwrap_or_else(|| DEFAULT_RESPONSE_LANGUAGE.to_string()),
        );

        Ok(Self {
            db_path,
            bind_addr,
            token_ttl: chrono::Duration::hours(token_ttl_hours),
            llm,
        })
    }

    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:5000");
        assert_eq!(cfg.token_ttl, chrono::Duration::hours(24));
        assert!(cfg.db_path.ends_with("clinirec.db"));
        assert!(!cfg.llm.is_complete());
        assert_eq!(cfg.llm.response_language, "English");
        assert_eq!(cfg.llm.timeout, Duration::from_secs(120));
    }

    #[test]
    fn llm_values_are_trimmed_and_blank_is_absent() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("LLM_BASE_URL", "  https://llm.example/v1  "),
            ("LLM_API_KEY", "   "),
            ("LLM_MODEL", "clinical-7b"),
        ]))
        .unwrap();
        assert_eq!(cfg.llm.base_url.as_deref(), Some("https://llm.example/v1"));
        assert_eq!(cfg.llm.api_key, None);
        assert_eq!(cfg.llm.model.as_deref(), Some("clinical-7b"));
        assert!(!cfg.llm.is_complete());
    }

    #[test]
    fn openai_variables_are_fallbacks() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("LLM_BASE_URL", "https://llm.example/v1"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-test"),
        ]))
        .unwrap();
        assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.llm.model.as_deref(), Some("gpt-test"));
        assert!(cfg.llm.is_complete());
    }

    #[test]
    fn primary_variables_win_over_openai_ones() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("LLM_API_KEY", "primary"),
            ("OPENAI_API_KEY", "secondary"),
        ]))
        .unwrap();
        assert_eq!(cfg.llm.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn invalid_addr_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("CLINIREC_ADDR", "not-an-addr")]))
            .unwrap_err();
        assert!(err.to_string().contains("CLINIREC_ADDR"));
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[("CLINIREC_TOKEN_TTL_HOURS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("CLINIREC_TOKEN_TTL_HOURS", "abc")])).is_err());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let llm = LlmConfig::new(
            Some("https://llm.example/v1".into()),
            Some("sk-secret".into()),
            Some("m".into()),
        );
        let printed = format!("{llm:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
