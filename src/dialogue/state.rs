//! Dialogue states and terminal outcomes

use crate::llm::LlmError;
use crate::suggest::CandidateList;

/// The tagged state of one dialogue run.
///
/// Owned exclusively by [`super::Dialogue`]; each variant carries only the
/// data that state needs. The original query lives on the machine itself
/// because every state reads it.
#[derive(Debug)]
pub enum DialogueState {
    /// Entry state, nothing has happened yet
    Init,
    /// A backend call is outstanding
    Analyzing { context: Vec<String> },
    /// The backend asked a follow-up question; collecting one line of input
    Asking {
        prompt: String,
        context: Vec<String>,
        input: String,
    },
    /// A resolved command is ready for user choice
    Selecting { candidates: CandidateList },
    /// Terminal: user confirmed execution
    Completed { command: String },
    /// Terminal: user chose to copy instead of execute
    Copied { command: String },
    /// Terminal: unrecoverable classified failure
    Error { error: LlmError },
    /// Terminal: user aborted
    Canceled,
}

impl DialogueState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DialogueState::Completed { .. }
                | DialogueState::Copied { .. }
                | DialogueState::Error { .. }
                | DialogueState::Canceled
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            DialogueState::Init => "init",
            DialogueState::Analyzing { .. } => "analyzing",
            DialogueState::Asking { .. } => "asking",
            DialogueState::Selecting { .. } => "selecting",
            DialogueState::Completed { .. } => "completed",
            DialogueState::Copied { .. } => "copied",
            DialogueState::Error { .. } => "error",
            DialogueState::Canceled => "canceled",
        }
    }
}

/// What a finished run means for the process.
#[derive(Debug)]
pub enum Outcome {
    /// Execute this command and exit with its status
    Run(String),
    /// The command was placed on the clipboard
    Copied(String),
    /// Clean user abort
    Canceled,
    /// Classified failure; exit non-zero
    Failed(LlmError),
}
