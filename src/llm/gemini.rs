//! Gemini `generateContent` provider over plain HTTP.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::provider::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role};
use crate::error::LlmError;

const PROVIDER: &str = "gemini";

pub struct GeminiProvider {
    base_url: String,
    model: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        model: &str,
        api_key: SecretString,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(rename = "system_instruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    response_id: Option<String>,
}

fn build_request(request: &CompletionRequest) -> GenerateRequest {
    let system_instruction = request.system_text().map(|text| Content {
        role: None,
        parts: vec![Part { text }],
    });

    let contents = request
        .messages
        .iter()
        .filter_map(|m| {
            let role = match m.role {
                Role::System => return None,
                Role::User => "user",
            };
            Some(Content {
                role: Some(role.to_string()),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
        })
        .collect();

    GenerateRequest {
        system_instruction,
        contents,
    }
}

fn parse_response(body: &str) -> Result<CompletionResponse, LlmError> {
    let parsed: GenerateResponse = serde_json::from_str(body)?;

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "response contained no candidates".to_string(),
        })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: format!(
                "candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        });
    }

    let finish_reason = match candidate.finish_reason.as_deref() {
        Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
            FinishReason::ContentFilter
        }
        _ => FinishReason::Unknown,
    };
    let usage = parsed.usage_metadata.unwrap_or_default();

    Ok(CompletionResponse {
        content: text,
        input_tokens: usage.prompt_token_count,
        output_tokens: usage.candidates_token_count,
        finish_reason,
        response_id: parsed.response_id,
    })
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = build_request(&request);

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);
        let text = resp.text().await.map_err(|e| LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: e.to_string(),
        })?;

        match status.as_u16() {
            200..=299 => {}
            401 | 403 => {
                return Err(LlmError::AuthFailed {
                    provider: PROVIDER.to_string(),
                });
            }
            429 => {
                return Err(LlmError::RateLimited {
                    provider: PROVIDER.to_string(),
                    retry_after,
                });
            }
            _ => {
                return Err(LlmError::RequestFailed {
                    provider: PROVIDER.to_string(),
                    reason: format!("HTTP {status}: {text}"),
                });
            }
        }

        let response = parse_response(&text)?;
        tracing::debug!(
            model = %self.model,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Gemini completion finished"
        );
        Ok(response)
    }
}
