//! Inputs to and outputs of the dialogue reducer

use crate::llm::{LlmError, SmartReply};

/// One input event for the dialogue machine.
///
/// User intents arrive at key granularity; printable characters are plain
/// `Char` events and the machine decides per state whether a character is
/// text input or a binding (`j`/`k`/`c`/`q` outside of text entry).
#[derive(Debug)]
pub enum DialogueEvent {
    /// Kick off the run: enabled-precondition check, then the first query
    Begin,
    /// An outstanding backend call finished
    Reply(Result<SmartReply, LlmError>),
    /// The asynchronous clipboard write finished
    CopyDone(Result<(), String>),
    /// A printable character was typed
    Char(char),
    Backspace,
    /// Enter: confirm a candidate or submit a clarification answer
    Submit,
    /// Esc: cancel the run
    Cancel,
    /// Ctrl+C: cancel from any state, overriding everything else
    Interrupt,
    CursorUp,
    CursorDown,
}

/// A side effect requested by a transition, described as data.
///
/// The reducer never performs I/O; the event-loop driver executes these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start exactly one asynchronous backend call with this prompt
    Query(String),
    /// Start exactly one asynchronous clipboard write
    CopyToClipboard(String),
    /// A terminal state was reached; stop the event loop
    Quit,
}
