//! Gemini (Google) LLM provider implementation
//!
//! Gemini has no separate system role in the `generateContent` shape used
//! here, so the instructions are folded into the single user part.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::prompt::system_prompt;
use super::types::{parse_smart_reply, SmartReply};
use super::{LlmError, LlmProvider};
use crate::config::GeminiConfig;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(cfg: &GeminiConfig) -> Result<Self> {
        let base_url = cfg
            .base_url
            .as_deref()
            .unwrap_or(GEMINI_API_URL)
            .trim_end_matches('/')
            .to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn ask_smart(&self, prompt: &str) -> Result<SmartReply, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: format!("{}\n\nUser request: {prompt}", system_prompt()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                top_p: 0.8,
                max_output_tokens: 1000,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from_network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_http_status(status, body));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            LlmError::general(format!("failed to decode Gemini response: {e}")).with_source(e)
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        if text.is_empty() {
            return Err(LlmError::general("Gemini returned an empty response"));
        }
        parse_smart_reply(&text)
    }
}

// Gemini generateContent request/response types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_tracks_api_key() {
        let disabled = GeminiProvider::new(&GeminiConfig::default()).unwrap();
        assert!(!disabled.enabled());

        let cfg = GeminiConfig {
            api_key: "g-key".to_string(),
            ..GeminiConfig::default()
        };
        let enabled = GeminiProvider::new(&cfg).unwrap();
        assert!(enabled.enabled());
        assert_eq!(enabled.name(), "gemini");
    }

    #[test]
    fn test_response_deserializes_first_candidate() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"command\":\"uptime\"}"}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.candidates[0].content.parts[0].text,
            r#"{"command":"uptime"}"#
        );
    }
}
