//! Azure OpenAI LLM provider implementation
//!
//! Same chat-completions payload as OpenAI; the differences are the
//! per-deployment URL, the `api-key` header and the `api-version` query
//! parameter.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use super::openai_compat::{AuthScheme, ChatEndpoint, OpenAiCompatClient};
use super::prompt::system_prompt;
use super::types::{parse_smart_reply, SmartReply};
use super::{LlmError, LlmProvider};
use crate::config::AzureOpenAiConfig;

pub struct AzureOpenAiProvider {
    client: OpenAiCompatClient,
    enabled: bool,
}

impl AzureOpenAiProvider {
    pub fn new(cfg: &AzureOpenAiConfig) -> Result<Self> {
        let base = cfg.base_url.trim_end_matches('/');
        let client = OpenAiCompatClient::new(ChatEndpoint {
            url: format!(
                "{base}/openai/deployments/{}/chat/completions",
                cfg.deployment_id
            ),
            auth: AuthScheme::ApiKeyHeader(cfg.api_key.clone()),
            query: vec![("api-version".to_string(), cfg.api_version.clone())],
            headers: Vec::new(),
            // Azure routes by deployment id rather than model name
            model: cfg.deployment_id.clone(),
            json_mode: true,
            timeout: Duration::from_secs(cfg.timeout_secs.max(1)),
        })?;
        Ok(Self {
            client,
            enabled: !cfg.api_key.is_empty()
                && !cfg.base_url.is_empty()
                && !cfg.deployment_id.is_empty(),
        })
    }
}

#[async_trait]
impl LlmProvider for AzureOpenAiProvider {
    fn name(&self) -> &str {
        "azure-openai"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn ask_smart(&self, prompt: &str) -> Result<SmartReply, LlmError> {
        let raw = self.client.ask(&system_prompt(), prompt).await?;
        parse_smart_reply(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_needs_key_base_and_deployment() {
        let mut cfg = AzureOpenAiConfig {
            api_key: "key".to_string(),
            base_url: "https://example.openai.azure.com".to_string(),
            ..AzureOpenAiConfig::default()
        };
        assert!(!AzureOpenAiProvider::new(&cfg).unwrap().enabled());

        cfg.deployment_id = "gpt-35".to_string();
        let provider = AzureOpenAiProvider::new(&cfg).unwrap();
        assert!(provider.enabled());
        assert_eq!(provider.name(), "azure-openai");
    }
}
