//! LLM integration for Bolt Responder.
//!
//! Supports:
//! - **Gemini**: the `generateContent` REST API over reqwest
//!
//! Callers depend only on the `LlmProvider` trait so tests can swap in a stub.

mod gemini;
pub mod provider;

pub use gemini::GeminiProvider;
pub use provider::*;

use std::sync::Arc;

use crate::error::LlmError;

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub base_url: String,
}

/// Create the Gemini provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("bolt-responder/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LlmError::RequestFailed {
            provider: "gemini".to_string(),
            reason: format!("Failed to create Gemini client: {}", e),
        })?;

    tracing::info!("Using Gemini (model: {})", config.model);
    Ok(Arc::new(GeminiProvider::new(
        client,
        &config.base_url,
        &config.model,
        config.api_key.clone(),
    )))
}
