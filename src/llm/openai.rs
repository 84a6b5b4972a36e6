//! OpenAI LLM provider implementation

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use super::openai_compat::{AuthScheme, ChatEndpoint, OpenAiCompatClient};
use super::prompt::system_prompt;
use super::types::{parse_smart_reply, SmartReply};
use super::{LlmError, LlmProvider};
use crate::config::OpenAiConfig;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    client: OpenAiCompatClient,
    enabled: bool,
}

impl OpenAiProvider {
    pub fn new(cfg: &OpenAiConfig) -> Result<Self> {
        let base = cfg
            .base_url
            .as_deref()
            .unwrap_or(OPENAI_API_URL)
            .trim_end_matches('/')
            .to_string();
        let headers = cfg
            .org_id
            .iter()
            .map(|org| ("OpenAI-Organization".to_string(), org.clone()))
            .collect();
        let client = OpenAiCompatClient::new(ChatEndpoint {
            url: format!("{base}/chat/completions"),
            auth: AuthScheme::Bearer(cfg.api_key.clone()),
            query: Vec::new(),
            headers,
            model: cfg.model.clone(),
            json_mode: true,
            timeout: Duration::from_secs(cfg.timeout_secs.max(1)),
        })?;
        Ok(Self {
            client,
            enabled: !cfg.api_key.is_empty(),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn ask_smart(&self, prompt: &str) -> Result<SmartReply, LlmError> {
        let raw = self.client.ask(&system_prompt(), prompt).await?;
        parse_smart_reply(&raw)
    }
}
