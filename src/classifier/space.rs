//! Hosted Gradio space classifier.
//!
//! Uses the two-step call API: `POST /gradio_api/call/predict` queues the
//! job and returns an event id, then `GET /gradio_api/call/predict/{id}`
//! streams server-sent events until `complete` (or `error`).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{Classifier, ClassifierOutput, check_status, request_failed};
use crate::error::ClassifierError;

const BACKEND: &str = "space";

/// Classifier backed by a hosted space whose `/predict` endpoint returns
/// a `"LABEL_k (xx.xx%)"` string.
pub struct SpaceClassifier {
    base_url: String,
    token: Option<SecretString>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct QueuedCall {
    event_id: String,
}

impl SpaceClassifier {
    pub fn new(client: reqwest::Client, base_url: &str, token: Option<SecretString>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        }
    }

    fn call_url(&self) -> String {
        format!("{}/gradio_api/call/predict", self.base_url)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }
}

#[async_trait]
impl Classifier for SpaceClassifier {
    fn backend_name(&self) -> &str {
        BACKEND
    }

    async fn classify(&self, text: &str) -> Result<ClassifierOutput, ClassifierError> {
        let resp = self
            .authorized(self.client.post(self.call_url()))
            .json(&serde_json::json!({ "data": [text] }))
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        let body = check_status(BACKEND, resp)
            .await?
            .text()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        let queued = parse_queued_call(&body)?;

        tracing::debug!(event_id = %queued.event_id, "Classifier call queued");

        let resp = self
            .authorized(
                self.client
                    .get(format!("{}/{}", self.call_url(), queued.event_id)),
            )
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        let stream = check_status(BACKEND, resp)
            .await?
            .text()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;

        parse_event_stream(&stream).map(ClassifierOutput::StringEncoded)
    }
}

/// Read the event id out of the queue response.
fn parse_queued_call(body: &str) -> Result<QueuedCall, ClassifierError> {
    serde_json::from_str(body).map_err(|_| ClassifierError::UnexpectedResponse)
}

/// Extract the first result string from a Gradio call event stream.
fn parse_event_stream(stream: &str) -> Result<String, ClassifierError> {
    let mut event = "";
    for line in stream.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = name.trim();
            continue;
        }
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        match event {
            "complete" => {
                let values: Vec<serde_json::Value> =
                    serde_json::from_str(data).map_err(|_| ClassifierError::UnexpectedResponse)?;
                return match values.into_iter().next() {
                    Some(serde_json::Value::String(result)) => Ok(result),
                    _ => Err(ClassifierError::UnexpectedResponse),
                };
            }
            "error" => {
                return Err(ClassifierError::RequestFailed {
                    backend: BACKEND.to_string(),
                    reason: format!("space reported an error: {data}"),
                });
            }
            _ => {}
        }
    }
    Err(ClassifierError::UnexpectedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_event_yields_first_value() {
        let stream = "event: generating\ndata: null\n\n\
                      event: complete\ndata: [\"LABEL_2 (87.50%)\"]\n\n";
        assert_eq!(parse_event_stream(stream).unwrap(), "LABEL_2 (87.50%)");
    }

    #[test]
    fn heartbeat_before_complete_is_skipped() {
        let stream = "event: heartbeat\ndata: null\n\nevent: complete\ndata: [\"Other\", 1]\n";
        assert_eq!(parse_event_stream(stream).unwrap(), "Other");
    }

    #[test]
    fn error_event_is_request_failure() {
        let err = parse_event_stream("event: error\ndata: \"model not loaded\"\n").unwrap_err();
        match err {
            ClassifierError::RequestFailed { backend, reason } => {
                assert_eq!(backend, "space");
                assert!(reason.contains("model not loaded"));
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }

    #[test]
    fn non_string_result_is_unexpected() {
        let err = parse_event_stream("event: complete\ndata: [42]\n").unwrap_err();
        assert!(matches!(err, ClassifierError::UnexpectedResponse));

        let err = parse_event_stream("event: complete\ndata: []\n").unwrap_err();
        assert!(matches!(err, ClassifierError::UnexpectedResponse));
    }

    #[test]
    fn stream_without_complete_is_unexpected() {
        let err = parse_event_stream("event: heartbeat\ndata: null\n").unwrap_err();
        assert!(matches!(err, ClassifierError::UnexpectedResponse));
        assert!(matches!(
            parse_event_stream("").unwrap_err(),
            ClassifierError::UnexpectedResponse
        ));
    }

    #[test]
    fn queue_response_needs_event_id() {
        assert_eq!(parse_queued_call(r#"{"event_id": "abc"}"#).unwrap().event_id, "abc");
        for body in ["<html>busy</html>", "{}", r#"{"event_id": 7}"#] {
            assert!(matches!(
                parse_queued_call(body).unwrap_err(),
                ClassifierError::UnexpectedResponse
            ));
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let classifier = SpaceClassifier::new(reqwest::Client::new(), "http://host/", None);
        assert_eq!(classifier.call_url(), "http://host/gradio_api/call/predict");
    }
}
