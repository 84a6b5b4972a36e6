//! Claude (Anthropic) LLM provider implementation

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::prompt::system_prompt;
use super::types::{parse_smart_reply, SmartReply};
use super::{LlmError, LlmProvider};
use crate::config::ClaudeConfig;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl ClaudeProvider {
    pub fn new(cfg: &ClaudeConfig) -> Result<Self> {
        let base = cfg
            .base_url
            .as_deref()
            .unwrap_or(ANTHROPIC_API_URL)
            .trim_end_matches('/')
            .to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            url: format!("{base}/v1/messages"),
        })
    }

    async fn send_request(&self, request: ClaudeRequest) -> Result<ClaudeResponse, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from_network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_http_status(status, body));
        }

        response.json::<ClaudeResponse>().await.map_err(|e| {
            LlmError::general(format!("failed to decode Claude response: {e}")).with_source(e)
        })
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    fn name(&self) -> &str {
        "claude"
    }

    fn enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn ask_smart(&self, prompt: &str) -> Result<SmartReply, LlmError> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 1000,
            system: Some(system_prompt()),
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.2,
        };

        let response = self.send_request(request).await?;

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() {
            return Err(LlmError::general("Claude returned an empty response"));
        }
        parse_smart_reply(&text)
    }
}

// Anthropic messages API request/response types

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ClaudeMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContentBlock>,
}
