//! Shared client for OpenAI-compatible chat-completions endpoints
//!
//! OpenAI, Azure OpenAI and other chat-completions clones differ only in
//! endpoint URL, auth header and query string. Each such backend builds a
//! [`ChatEndpoint`] describing its differences and reuses this client for
//! the request/response mechanics.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::error::LlmError;

/// How the endpoint authenticates requests
#[derive(Debug, Clone)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// Azure-style `api-key: <key>` header
    ApiKeyHeader(String),
    /// No auth (e.g. a local server)
    None,
}

/// Everything that varies between OpenAI-compatible backends
#[derive(Debug, Clone)]
pub struct ChatEndpoint {
    /// Full chat-completions URL
    pub url: String,
    pub auth: AuthScheme,
    /// Extra query pairs, e.g. Azure's `api-version`
    pub query: Vec<(String, String)>,
    /// Extra headers, e.g. `OpenAI-Organization`
    pub headers: Vec<(String, String)>,
    /// Model name, or the deployment id for Azure
    pub model: String,
    /// Whether the endpoint honors `response_format: json_object`
    pub json_mode: bool,
    pub timeout: Duration,
}

pub struct OpenAiCompatClient {
    endpoint: ChatEndpoint,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(endpoint: ChatEndpoint) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .build()?;
        Ok(Self { endpoint, client })
    }

    /// Send one system+user exchange and return the assistant text.
    pub async fn ask(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.endpoint.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: 0.2,
            response_format: self
                .endpoint
                .json_mode
                .then(|| ResponseFormat {
                    format_type: "json_object".to_string(),
                }),
        };

        let mut builder = self.client.post(&self.endpoint.url);
        if !self.endpoint.query.is_empty() {
            builder = builder.query(&self.endpoint.query);
        }
        builder = match &self.endpoint.auth {
            AuthScheme::Bearer(token) => builder.bearer_auth(token),
            AuthScheme::ApiKeyHeader(key) => builder.header("api-key", key),
            AuthScheme::None => builder,
        };
        for (name, value) in &self.endpoint.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from_network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_http_status(status, body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            LlmError::general(format!("failed to decode chat response: {e}")).with_source(e)
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.is_empty() {
            return Err(LlmError::general("backend returned an empty response"));
        }
        Ok(content)
    }
}

// Chat-completions request/response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_json_mode() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![],
            temperature: 0.2,
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""response_format":{"type":"json_object"}"#));
    }

    #[test]
    fn test_request_omits_response_format_when_disabled() {
        let request = ChatRequest {
            model: "local".to_string(),
            messages: vec![],
            temperature: 0.2,
            response_format: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("response_format"));
    }

    #[test]
    fn test_response_deserializes_choices() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"command\":\"ls\"}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, r#"{"command":"ls"}"#);
    }
}
