//! LLM provider implementations

mod azure_openai;
mod claude;
mod error;
mod gemini;
mod llama_cpp;
mod openai;
mod openai_compat;
mod prompt;
mod types;

pub use azure_openai::AzureOpenAiProvider;
pub use claude::ClaudeProvider;
pub use error::{ErrorKind, LlmError};
pub use gemini::GeminiProvider;
pub use llama_cpp::LlamaCppProvider;
pub use openai::OpenAiProvider;
pub use types::{parse_smart_reply, SmartReply};

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;

/// Trait for LLM providers
///
/// Implementations translate their wire format into the normalized
/// [`SmartReply`] shape and classify their own failures; the dialogue core
/// never sees provider-specific types. `ask_smart` has no caller-visible
/// side effect besides the network call and must return once its configured
/// timeout expires.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name, used as the provenance tag on suggestions
    fn name(&self) -> &str;

    /// Whether the provider has enough configuration to be called
    fn enabled(&self) -> bool;

    /// Resolve a prompt into either a command or a follow-up question
    async fn ask_smart(&self, prompt: &str) -> Result<SmartReply, LlmError>;
}

/// Create the configured LLM provider.
///
/// Selection happens exactly once, here; afterwards the rest of the program
/// only sees the trait object. A provider missing its credentials still
/// constructs anyway; it reports `enabled() == false` and the dialogue
/// surfaces that as an auth error instead of a startup crash.
pub fn create_provider(config: &Config) -> Result<Box<dyn LlmProvider>> {
    match config.llm.provider.to_lowercase().as_str() {
        "openai" | "gpt" => Ok(Box::new(OpenAiProvider::new(&config.llm.openai)?)),
        "azure-openai" | "azure" => Ok(Box::new(AzureOpenAiProvider::new(
            &config.llm.azure_openai,
        )?)),
        "gemini" | "google" => Ok(Box::new(GeminiProvider::new(&config.llm.gemini)?)),
        "claude" | "anthropic" => Ok(Box::new(ClaudeProvider::new(&config.llm.claude)?)),
        "llama-cpp" | "llama" | "local" => {
            Ok(Box::new(LlamaCppProvider::new(&config.llm.llama_cpp)?))
        }
        other => anyhow::bail!(
            "Unknown LLM provider: {other}. Supported: openai, azure-openai, gemini, claude, llama-cpp"
        ),
    }
}
