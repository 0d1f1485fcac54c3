//! Configuration types.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::classifier::{ClassifierBackend, ClassifierConfig};
use crate::error::ConfigError;
use crate::llm::LlmConfig;

/// Hosted space that serves the fine-tuned intent classifier.
pub const DEFAULT_CLASSIFIER_SPACE: &str = "hshkoukani/bolt-space";

pub const DEFAULT_LLM_MODEL: &str = "gemini-2.0-flash";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

pub const DEFAULT_PORT: u16 = 5000;

/// Service configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port bound on 0.0.0.0.
    pub port: u16,
    pub classifier: ClassifierConfig,
    pub llm: LlmConfig,
    /// Upper bound on a single classifier call.
    pub classify_timeout: Duration,
    /// Upper bound on a single generation call.
    pub generate_timeout: Duration,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;

        let api_key =
            get("GEMINI_KEY").ok_or_else(|| ConfigError::MissingEnvVar("GEMINI_KEY".into()))?;
        let llm = LlmConfig {
            api_key: SecretString::from(api_key),
            model: get("BOLT_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            base_url: get("BOLT_LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        };

        let backend: ClassifierBackend =
            parse_or(&get, "BOLT_CLASSIFIER_BACKEND", ClassifierBackend::Space)?;
        let token = get("HF_TOKEN").map(SecretString::from);
        if backend == ClassifierBackend::Inference && token.is_none() {
            return Err(ConfigError::MissingEnvVar("HF_TOKEN".into()));
        }

        let space = get("BOLT_CLASSIFIER_SPACE")
            .unwrap_or_else(|| DEFAULT_CLASSIFIER_SPACE.to_string());
        let base_url = get("BOLT_CLASSIFIER_URL").unwrap_or_else(|| match backend {
            ClassifierBackend::Space => space_url(&space),
            ClassifierBackend::Inference => DEFAULT_HF_INFERENCE_URL.to_string(),
        });
        let classifier = ClassifierConfig {
            backend,
            base_url,
            model: get("BOLT_CLASSIFIER_MODEL").unwrap_or(space),
            token,
        };

        let classify_secs: u64 = parse_or(&get, "BOLT_CLASSIFY_TIMEOUT_SECS", 30)?;
        let generate_secs: u64 = parse_or(&get, "BOLT_GENERATE_TIMEOUT_SECS", 60)?;

        Ok(Self {
            port,
            classifier,
            llm,
            classify_timeout: Duration::from_secs(classify_secs),
            generate_timeout: Duration::from_secs(generate_secs),
        })
    }
}

/// Public URL of a hosted space, e.g. `owner/my_space` → `https://owner-my-space.hf.space`.
pub fn space_url(space: &str) -> String {
    let slug: String = space
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if matches!(c, '/' | '_' | '.') { '-' } else { c })
        .collect();
    format!("https://{slug}.hf.space")
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
