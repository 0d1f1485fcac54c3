//! Intent classifier adapter.
//!
//! Two transports are supported, one active per process:
//! - **Space**: a hosted Gradio space that answers with a formatted string,
//!   e.g. `"LABEL_2 (87.50%)"`.
//! - **Inference**: a hosted inference endpoint that answers with
//!   `[{label, score}, ...]` records.
//!
//! Both produce a [`ClassifierOutput`], which is normalized exactly once
//! into a [`ClassificationResult`] before anything downstream sees it.

mod inference;
mod space;

pub use inference::InferenceClassifier;
pub use space::SpaceClassifier;

use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

static STRING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(LABEL_\d+) \((\d+\.\d+)%\)").expect("static classifier label pattern")
});

/// Which classifier transport to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierBackend {
    Space,
    Inference,
}

impl ClassifierBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Inference => "inference",
        }
    }
}

impl FromStr for ClassifierBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "space" | "gradio" => Ok(Self::Space),
            "inference" | "hf-inference" => Ok(Self::Inference),
            other => Err(format!(
                "unknown classifier backend '{other}' (expected 'space' or 'inference')"
            )),
        }
    }
}

/// Configuration for creating a classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub backend: ClassifierBackend,
    /// Base URL of the space or inference host.
    pub base_url: String,
    /// Model id, used by the inference backend.
    pub model: String,
    /// Bearer token for the hosting service.
    pub token: Option<secrecy::SecretString>,
}

/// One `{label, score}` record from a structured classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub label: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Classifier output as it arrived over the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierOutput {
    /// `"LABEL_k (xx.xx%)"` or any other free-form string.
    StringEncoded(String),
    /// Ranked records; the first one wins.
    Structured(Vec<RawPrediction>),
}

/// Normalized classification: raw label plus optional confidence in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub raw_label: String,
    pub confidence: Option<f64>,
}

impl ClassifierOutput {
    pub fn normalize(self) -> Result<ClassificationResult, ClassifierError> {
        match self {
            Self::StringEncoded(text) => Ok(parse_string_label(&text)),
            Self::Structured(records) => records
                .into_iter()
                .next()
                .map(|first| ClassificationResult {
                    raw_label: first.label,
                    confidence: first.score,
                })
                .ok_or(ClassifierError::UnexpectedResponse),
        }
    }
}

/// Parse `"LABEL_k (pp.pp%)"`. Anything else becomes the label verbatim
/// with no confidence.
pub fn parse_string_label(text: &str) -> ClassificationResult {
    if let Some(caps) = STRING_LABEL.captures(text)
        && let Ok(percent) = caps[2].parse::<f64>()
    {
        return ClassificationResult {
            raw_label: caps[1].to_string(),
            confidence: Some(percent / 100.0),
        };
    }
    ClassificationResult {
        raw_label: text.to_string(),
        confidence: None,
    }
}

/// External text classifier.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short backend name for logs and errors.
    fn backend_name(&self) -> &str;

    /// Classify free text.
    async fn classify(&self, text: &str) -> Result<ClassifierOutput, ClassifierError>;
}

/// Create a classifier from configuration.
pub fn create_classifier(
    config: &ClassifierConfig,
) -> Result<Arc<dyn Classifier>, ClassifierError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("bolt-responder/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ClassifierError::RequestFailed {
            backend: config.backend.as_str().to_string(),
            reason: format!("Failed to create HTTP client: {e}"),
        })?;

    let classifier: Arc<dyn Classifier> = match config.backend {
        ClassifierBackend::Space => {
            tracing::info!("Using hosted space classifier ({})", config.base_url);
            Arc::new(SpaceClassifier::new(client, &config.base_url, config.token.clone()))
        }
        ClassifierBackend::Inference => {
            tracing::info!("Using inference classifier (model: {})", config.model);
            Arc::new(InferenceClassifier::new(
                client,
                &config.base_url,
                &config.model,
                config.token.clone(),
            ))
        }
    };
    Ok(classifier)
}

/// Turn a non-2xx response into [`ClassifierError::Status`].
async fn check_status(
    backend: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ClassifierError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClassifierError::Status {
        backend: backend.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn request_failed(backend: &str, err: reqwest::Error) -> ClassifierError {
    ClassifierError::RequestFailed {
        backend: backend.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formatted_label() {
        let result = parse_string_label("LABEL_2 (87.50%)");
        assert_eq!(result.raw_label, "LABEL_2");
        assert_eq!(result.confidence, Some(0.875));
    }

    #[test]
    fn parses_multi_digit_label_with_trailing_text() {
        let result = parse_string_label("LABEL_12 (100.00%) extra");
        assert_eq!(result.raw_label, "LABEL_12");
        assert_eq!(result.confidence, Some(1.0));
    }

    #[test]
    fn unmatched_string_falls_back_to_raw_label() {
        for text in ["General Inquiry", "LABEL_2 (87%)", " LABEL_2 (87.50%)", "LABEL_2"] {
            let result = parse_string_label(text);
            assert_eq!(result.raw_label, text);
            assert_eq!(result.confidence, None);
        }
    }

    #[test]
    fn structured_takes_first_record() {
        let output = ClassifierOutput::Structured(vec![
            RawPrediction {
                label: "LABEL_3".into(),
                score: Some(0.42),
            },
            RawPrediction {
                label: "LABEL_0".into(),
                score: Some(0.30),
            },
        ]);
        let result = output.normalize().unwrap();
        assert_eq!(result.raw_label, "LABEL_3");
        assert_eq!(result.confidence, Some(0.42));
    }

    #[test]
    fn structured_without_score_is_null_confidence() {
        let records: Vec<RawPrediction> =
            serde_json::from_str(r#"[{"label": "LABEL_1"}]"#).unwrap();
        let result = ClassifierOutput::Structured(records).normalize().unwrap();
        assert_eq!(result.raw_label, "LABEL_1");
        assert_eq!(result.confidence, None);
    }

    #[test]
    fn empty_structured_is_unexpected() {
        let err = ClassifierOutput::Structured(vec![]).normalize().unwrap_err();
        assert!(matches!(err, ClassifierError::UnexpectedResponse));
    }

    #[test]
    fn backend_from_str() {
        assert_eq!("space".parse::<ClassifierBackend>(), Ok(ClassifierBackend::Space));
        assert_eq!(" Inference ".parse::<ClassifierBackend>(), Ok(ClassifierBackend::Inference));
        assert!("local".parse::<ClassifierBackend>().is_err());
    }

    #[test]
    fn create_classifier_for_each_backend() {
        for backend in [ClassifierBackend::Space, ClassifierBackend::Inference] {
            let config = ClassifierConfig {
                backend,
                base_url: "http://127.0.0.1:1".into(),
                model: "acme/intent".into(),
                token: None,
            };
            let classifier = create_classifier(&config).unwrap();
            assert_eq!(classifier.backend_name(), backend.as_str());
        }
    }
}
