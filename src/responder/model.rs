//! Request-scoped values flowing through the analyze pipeline.

use serde::{Deserialize, Serialize};

/// An email submitted for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEmail {
    /// Empty when the caller sent none.
    pub subject: String,
    pub body: String,
}

impl IncomingEmail {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Text handed to the classifier: `"{subject} {body}"`.
    pub fn classifier_text(&self) -> String {
        format!("{} {}", self.subject, self.body)
    }
}

/// Reply body produced by the generative model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    pub text: String,
}

/// One categorization entry. `score` serializes as `null` when unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: Option<f64>,
}

/// Successful `/analyze-label` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub result: Vec<LabelScore>,
    pub output: String,
}

impl ResponsePayload {
    pub fn assemble(
        category: impl Into<String>,
        confidence: Option<f64>,
        reply: GeneratedReply,
    ) -> Self {
        Self {
            result: vec![LabelScore {
                label: category.into(),
                score: confidence,
            }],
            output: reply.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_text_joins_with_space() {
        assert_eq!(IncomingEmail::new("Hi", "Body").classifier_text(), "Hi Body");
        assert_eq!(IncomingEmail::new("", "Body").classifier_text(), " Body");
    }

    #[test]
    fn payload_serializes_null_score() {
        let payload = ResponsePayload::assemble(
            "Whatever",
            None,
            GeneratedReply {
                text: "ok".into(),
            },
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"result": [{"label": "Whatever", "score": null}], "output": "ok"})
        );
    }

    #[test]
    fn payload_serializes_score() {
        let payload = ResponsePayload::assemble(
            "General Inquiry",
            Some(0.875),
            GeneratedReply {
                text: "Thanks!".into(),
            },
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["result"][0]["label"], "General Inquiry");
        assert_eq!(json["result"][0]["score"], 0.875);
        assert_eq!(json["output"], "Thanks!");
    }
}
