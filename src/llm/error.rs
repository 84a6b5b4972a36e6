//! Typed errors for LLM operations
//!
//! Every raw backend failure is classified exactly once, at the provider
//! boundary, into a small closed taxonomy so the rest of the program can key
//! behavior and user messaging off a stable `ErrorKind`.

use thiserror::Error;

/// Failure categories for backend calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid credentials
    Auth,
    /// Deadline exceeded
    Timeout,
    /// Rate or usage limit hit
    Quota,
    /// Transport/connectivity failure
    Network,
    /// Anything else, including malformed backend replies
    General,
}

/// A classified backend failure.
///
/// Constructed once where the raw failure is observed; never mutated after
/// that. The original cause stays reachable through `source()`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl LlmError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Quota, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::General, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One fixed user-facing sentence per kind.
    ///
    /// The sentences are pairwise distinct so the rendered error always tells
    /// the kinds apart.
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Auth => {
                "API key missing or invalid. Set the provider's API key and try again."
            }
            ErrorKind::Timeout => "The request timed out. Check your network connection.",
            ErrorKind::Quota => "API quota or rate limit exhausted. Check your account.",
            ErrorKind::Network => "Could not reach the backend. Check your connection.",
            ErrorKind::General => "The backend request failed. Run with -v for details.",
        }
    }

    /// Classify an HTTP error status together with the response body.
    pub fn from_http_status(status: reqwest::StatusCode, body: String) -> Self {
        let message = format!("HTTP {status}: {body}");
        match status.as_u16() {
            401 | 403 => Self::auth(message),
            408 => Self::timeout(message),
            429 => Self::quota(message),
            // 5xx and anything unexpected goes through the message heuristics
            // so wording like "quota exceeded" in a 500 body still lands right.
            _ => Self::from_message(message),
        }
    }

    /// Classify a transport-level `reqwest` failure by type inspection.
    pub fn from_network_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string()).with_source(err)
        } else if err.is_connect() {
            Self::network(err.to_string()).with_source(err)
        } else if let Some(status) = err.status() {
            Self::from_http_status(status, err.to_string())
        } else {
            Self::from_message(err.to_string()).with_source(err)
        }
    }

    /// Substring fallback for failures of unknown origin.
    ///
    /// Typed inspection is always preferred; this tier exists because not
    /// every integration produces a typed failure. Patterns are checked in
    /// priority order, first match wins.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        let kind = if contains_any(
            &lower,
            &["api key", "unauthorized", "authentication", "invalid key", "forbidden"],
        ) {
            ErrorKind::Auth
        } else if contains_any(&lower, &["timeout", "timed out", "deadline"]) {
            ErrorKind::Timeout
        } else if contains_any(&lower, &["quota", "rate limit", "too many requests", "429"]) {
            ErrorKind::Quota
        } else if contains_any(
            &lower,
            &["connection", "network", "dns", "unreachable", "connect error"],
        ) {
            ErrorKind::Network
        } else {
            ErrorKind::General
        };
        Self::new(kind, message)
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status() {
        assert_eq!(
            LlmError::from_http_status(reqwest::StatusCode::UNAUTHORIZED, "bad token".into())
                .kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            LlmError::from_http_status(reqwest::StatusCode::FORBIDDEN, "no".into()).kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            LlmError::from_http_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down".into())
                .kind(),
            ErrorKind::Quota
        );
        assert_eq!(
            LlmError::from_http_status(reqwest::StatusCode::REQUEST_TIMEOUT, "late".into()).kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            LlmError::from_http_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom".into())
                .kind(),
            ErrorKind::General
        );
    }

    #[test]
    fn test_message_heuristics() {
        assert_eq!(
            LlmError::from_message("OpenAI API key not configured").kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            LlmError::from_message("request timed out after 30s").kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            LlmError::from_message("you exceeded your current quota").kind(),
            ErrorKind::Quota
        );
        assert_eq!(
            LlmError::from_message("connection refused").kind(),
            ErrorKind::Network
        );
        assert_eq!(
            LlmError::from_message("something odd happened").kind(),
            ErrorKind::General
        );
    }

    #[test]
    fn test_classification_is_idempotent() {
        let raw = "deadline exceeded while awaiting headers";
        let first = LlmError::from_message(raw);
        let second = LlmError::from_message(raw);
        assert_eq!(first.kind(), second.kind());
        assert_eq!(first.message(), second.message());
    }

    #[test]
    fn test_auth_wins_over_later_patterns() {
        // A message matching several tiers classifies by the first match.
        let err = LlmError::from_message("authentication timeout over the network");
        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let kinds = [
            ErrorKind::Auth,
            ErrorKind::Timeout,
            ErrorKind::Quota,
            ErrorKind::Network,
            ErrorKind::General,
        ];
        let messages: Vec<&str> = kinds
            .iter()
            .map(|k| LlmError::new(*k, "x").user_message())
            .collect();
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_source_is_preserved() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "inner detail");
        let err = LlmError::general("outer").with_source(io_err);
        let source = std::error::Error::source(&err).expect("source kept");
        assert!(source.to_string().contains("inner detail"));
    }
}
