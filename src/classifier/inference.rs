//! Hosted inference endpoint classifier (structured `{label, score}` output).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{Classifier, ClassifierOutput, RawPrediction, check_status, request_failed};
use crate::error::ClassifierError;

const BACKEND: &str = "inference";

/// Text-classification endpoints answer either flat or nested one level
/// (one list per input).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Flat(Vec<RawPrediction>),
    Nested(Vec<Vec<RawPrediction>>),
}

impl InferenceResponse {
    fn into_records(self) -> Vec<RawPrediction> {
        match self {
            Self::Flat(records) => records,
            Self::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
        }
    }
}

pub struct InferenceClassifier {
    endpoint: String,
    token: Option<SecretString>,
    client: reqwest::Client,
}

impl InferenceClassifier {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        model: &str,
        token: Option<SecretString>,
    ) -> Self {
        Self {
            endpoint: format!("{}/models/{}", base_url.trim_end_matches('/'), model),
            token,
            client,
        }
    }
}

#[async_trait]
impl Classifier for InferenceClassifier {
    fn backend_name(&self) -> &str {
        BACKEND
    }

    async fn classify(&self, text: &str) -> Result<ClassifierOutput, ClassifierError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request.send().await.map_err(|e| request_failed(BACKEND, e))?;
        let body = check_status(BACKEND, resp)
            .await?
            .text()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;

        parse_records(&body).map(ClassifierOutput::Structured)
    }
}

fn parse_records(body: &str) -> Result<Vec<RawPrediction>, ClassifierError> {
    let parsed: InferenceResponse =
        serde_json::from_str(body).map_err(|_| ClassifierError::UnexpectedResponse)?;
    Ok(parsed.into_records())
}
