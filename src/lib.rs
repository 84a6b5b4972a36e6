//! termi: natural language in, a runnable shell command out
//!
//! This library provides:
//! - A dialogue state machine that resolves an ambiguous request through
//!   clarification turns with an LLM backend
//! - Pluggable LLM providers (OpenAI, Azure OpenAI, Gemini, Claude, llama.cpp)
//!   behind one capability trait
//! - A classified error taxonomy for backend failures
//! - A terminal UI for the clarification and selection flow

pub mod clipboard;
pub mod config;
pub mod dialogue;
pub mod llm;
pub mod runner;
pub mod suggest;
pub mod tui;

pub use config::Config;
pub use dialogue::{Dialogue, DialogueEvent, DialogueState, Effect, Outcome};
pub use llm::{create_provider, LlmProvider};
