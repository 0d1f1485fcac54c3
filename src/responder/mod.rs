//! Email intent responder.
//!
//! One request runs a strictly linear pipeline:
//! validate → classify → map label → generate reply → assemble.
//! Any failure ends the request; there are no retries and no partial results.

pub mod model;
pub mod prompts;

pub use model::{GeneratedReply, IncomingEmail, LabelScore, ResponsePayload};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::classifier::{ClassificationResult, Classifier};
use crate::error::{AnalyzeError, ClassifierError, LlmError};
use crate::labels::LabelMap;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Per-call limits for the two external services.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub classify_timeout: Duration,
    pub generate_timeout: Duration,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            classify_timeout: Duration::from_secs(30),
            generate_timeout: Duration::from_secs(60),
        }
    }
}

/// Validate a raw request body into an [`IncomingEmail`].
///
/// The body must be a JSON object with a string `body`. `subject` defaults
/// to empty when absent or not a string.
pub fn validate_request(raw: &[u8]) -> Result<IncomingEmail, AnalyzeError> {
    let value: Value = serde_json::from_slice(raw).map_err(|_| AnalyzeError::no_text())?;
    validate_value(&value)
}

pub fn validate_value(value: &Value) -> Result<IncomingEmail, AnalyzeError> {
    let Some(fields) = value.as_object() else {
        return Err(AnalyzeError::no_text());
    };
    let Some(body) = fields.get("body").and_then(Value::as_str) else {
        return Err(AnalyzeError::no_text());
    };
    let subject = fields
        .get("subject")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok(IncomingEmail::new(subject, body))
}

/// Classifies an email and drafts a reply.
///
/// Holds only shared, immutable handles, so one instance serves all requests.
pub struct EmailResponder {
    classifier: Arc<dyn Classifier>,
    llm: Arc<dyn LlmProvider>,
    labels: LabelMap,
    config: ResponderConfig,
}

impl EmailResponder {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        llm: Arc<dyn LlmProvider>,
        labels: LabelMap,
        config: ResponderConfig,
    ) -> Self {
        Self {
            classifier,
            llm,
            labels,
            config,
        }
    }

    /// Validate a raw request body, then run the full pipeline.
    pub async fn handle(&self, raw: &[u8]) -> Result<ResponsePayload, AnalyzeError> {
        let email = validate_request(raw)?;
        self.analyze(&email).await
    }

    pub async fn analyze(&self, email: &IncomingEmail) -> Result<ResponsePayload, AnalyzeError> {
        info!(
            subject_len = email.subject.len(),
            body_len = email.body.len(),
            "Analyzing email"
        );

        let classification = self.classify(email).await?;
        let category = self.labels.map_label(&classification.raw_label).to_string();
        info!(
            raw_label = %classification.raw_label,
            category = %category,
            score = ?classification.confidence,
            "Email classified"
        );

        let reply = self.generate_reply(email, &category).await?;
        Ok(ResponsePayload::assemble(category, classification.confidence, reply))
    }

    /// Call the classifier and normalize its output.
    pub async fn classify(
        &self,
        email: &IncomingEmail,
    ) -> Result<ClassificationResult, AnalyzeError> {
        let text = email.classifier_text();
        let after = self.config.classify_timeout;

        let output = timeout(after, self.classifier.classify(&text))
            .await
            .map_err(|_| ClassifierError::Timeout { after })??;
        debug!(backend = self.classifier.backend_name(), output = ?output, "Classifier result");

        Ok(output.normalize()?)
    }

    /// Ask the model for a reply body in the tone of `category`.
    pub async fn generate_reply(
        &self,
        email: &IncomingEmail,
        category: &str,
    ) -> Result<GeneratedReply, AnalyzeError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompts::SYSTEM_INSTRUCTION),
            ChatMessage::user(prompts::reply_prompt(&email.subject, &email.body, category)),
        ]);
        let after = self.config.generate_timeout;

        let result = match timeout(after, self.llm.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                provider: self.llm.model_name().to_string(),
                after,
            }),
        };

        match result {
            Ok(response) => Ok(GeneratedReply {
                text: response.content,
            }),
            Err(e) => {
                error!(model = self.llm.model_name(), error = %e, "Reply generation failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_full_request() {
        let email = validate_request(br#"{"subject": "Fees", "body": "How much?"}"#).unwrap();
        assert_eq!(email, IncomingEmail::new("Fees", "How much?"));
    }

    #[test]
    fn validate_defaults_subject() {
        let email = validate_request(br#"{"body": "How much?"}"#).unwrap();
        assert_eq!(email.subject, "");

        let email = validate_request(br#"{"subject": null, "body": "x"}"#).unwrap();
        assert_eq!(email.subject, "");
    }

    #[test]
    fn validate_accepts_empty_body_string() {
        let email = validate_request(br#"{"body": ""}"#).unwrap();
        assert_eq!(email.body, "");
    }

    #[test]
    fn validate_rejects_missing_body() {
        let cases: [&[u8]; 8] = [
            b"",
            b"not json",
            b"null",
            b"[]",
            b"\"body\"",
            br#"{"subject": "only"}"#,
            br#"{"body": null}"#,
            br#"{"body": 42}"#,
        ];
        for raw in cases {
            let err = validate_request(raw).unwrap_err();
            assert!(matches!(err, AnalyzeError::Client(_)));
            assert_eq!(err.message(), "No text provided");
        }
    }
}
