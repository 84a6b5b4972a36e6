//! llama.cpp server provider implementation
//!
//! Talks to the plain `/completion` endpoint of a local llama.cpp server.
//! No auth; the whole instruction goes out as one raw prompt and the reply
//! comes back in a single `content` field.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::prompt::system_prompt;
use super::types::{parse_smart_reply, SmartReply};
use super::{LlmError, LlmProvider};
use crate::config::LlamaCppConfig;

pub struct LlamaCppProvider {
    client: reqwest::Client,
    base_url: String,
}

impl LlamaCppProvider {
    pub fn new(cfg: &LlamaCppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LlmProvider for LlamaCppProvider {
    fn name(&self) -> &str {
        "llama-cpp"
    }

    fn enabled(&self) -> bool {
        !self.base_url.is_empty()
    }

    async fn ask_smart(&self, prompt: &str) -> Result<SmartReply, LlmError> {
        let url = format!("{}/completion", self.base_url);

        let request = CompletionRequest {
            prompt: format!(
                "{}\n\nUser request: {prompt}\n\nReply with the JSON object now:",
                system_prompt()
            ),
            max_tokens: 1000,
            temperature: 0.2,
            top_p: 0.8,
            stop: vec!["<|im_end|>".to_string(), "\n\n".to_string()],
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from_network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_http_status(status, body));
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            LlmError::general(format!("failed to decode llama.cpp response: {e}")).with_source(e)
        })?;

        let text = parsed.content.trim();
        if text.is_empty() {
            return Err(LlmError::general("llama.cpp returned an empty response"));
        }
        parse_smart_reply(text)
    }
}

// llama.cpp /completion request/response types

#[derive(Debug, Serialize)]
struct CompletionRequest {
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stop: Vec<String>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    content: String,
}
