//! Shared reply shape for all LLM providers

use serde::Deserialize;

use super::error::LlmError;

/// Normalized reply from a backend: either a runnable command or a follow-up
/// question for the user.
///
/// On a useful reply exactly one field is non-empty. Both empty is a valid
/// but unhelpful response the dialogue machine handles explicitly; providers
/// never turn it into an error themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SmartReply {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub ask: String,
}

impl SmartReply {
    pub fn command(text: impl Into<String>) -> Self {
        Self {
            command: text.into(),
            ask: String::new(),
        }
    }

    pub fn ask(text: impl Into<String>) -> Self {
        Self {
            command: String::new(),
            ask: text.into(),
        }
    }

    pub fn has_command(&self) -> bool {
        !self.command.is_empty()
    }

    pub fn has_ask(&self) -> bool {
        !self.ask.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_command() && !self.has_ask()
    }
}

/// Parse a model's structured reply into a [`SmartReply`].
///
/// Models occasionally wrap the JSON object in a markdown code fence even
/// when told not to; the fence is tolerated and stripped. Anything that
/// still fails to parse surfaces as a `General`-kind error carrying a
/// snippet of the raw output.
pub fn parse_smart_reply(raw: &str) -> Result<SmartReply, LlmError> {
    let stripped = strip_code_fences(raw);
    let reply: SmartReply = serde_json::from_str(stripped).map_err(|e| {
        LlmError::general(format!(
            "malformed backend reply: {e}; raw output: {}",
            snippet(raw)
        ))
        .with_source(e)
    })?;
    Ok(SmartReply {
        command: reply.command.trim().to_string(),
        ask: reply.ask.trim().to_string(),
    })
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

fn snippet(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::error::ErrorKind;

    #[test]
    fn test_parse_plain_command() {
        let reply = parse_smart_reply(r#"{"command": "ping -c 4 baidu.com"}"#).unwrap();
        assert_eq!(reply.command, "ping -c 4 baidu.com");
        assert!(reply.has_command());
        assert!(!reply.has_ask());
    }

    #[test]
    fn test_parse_ask() {
        let reply = parse_smart_reply(r#"{"ask": "你要删除哪个文件?"}"#).unwrap();
        assert_eq!(reply.ask, "你要删除哪个文件?");
        assert!(reply.has_ask());
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"command\": \"df -h\"}\n```";
        let reply = parse_smart_reply(raw).unwrap();
        assert_eq!(reply.command, "df -h");
    }

    #[test]
    fn test_parse_bare_fence() {
        let raw = "```\n{\"ask\": \"which directory?\"}\n```";
        let reply = parse_smart_reply(raw).unwrap();
        assert_eq!(reply.ask, "which directory?");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let reply = parse_smart_reply(r#"{"command": "  ls -la  "}"#).unwrap();
        assert_eq!(reply.command, "ls -la");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let reply = parse_smart_reply("{}").unwrap();
        assert!(reply.is_empty());
    }

    #[test]
    fn test_malformed_reply_is_general_error() {
        let err = parse_smart_reply("sure, run `ls -la`").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::General);
        assert!(err.message().contains("malformed backend reply"));
    }
}
