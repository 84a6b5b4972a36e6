//! The dialogue state machine
//!
//! A synchronous reducer: every input is a [`DialogueEvent`], every transition
//! returns the [`Effect`]s the driver should execute. No I/O happens here,
//! which is what makes the whole clarification protocol testable without a
//! terminal or a live backend.

use super::event::{DialogueEvent, Effect};
use super::state::{DialogueState, Outcome};
use crate::llm::LlmError;
use crate::suggest::{CandidateList, Suggestion};

/// Build the outgoing prompt from accumulated context and the original query.
///
/// Pure function: earlier clarifications are joined oldest-first so later
/// prompts always see them in original sequence.
pub fn build_prompt(context: &[String], query: &str) -> String {
    if context.is_empty() {
        query.to_string()
    } else {
        format!("{} {}", context.join(" "), query)
    }
}

/// Drives one natural-language request to a terminal outcome.
pub struct Dialogue {
    state: DialogueState,
    query: String,
    backend_name: String,
    backend_enabled: bool,
    /// Upper bound on clarification round trips; 0 means unbounded
    max_clarify_turns: usize,
    turns: usize,
    pending_copy: Option<String>,
}

impl Dialogue {
    pub fn new(
        query: impl Into<String>,
        backend_name: impl Into<String>,
        backend_enabled: bool,
    ) -> Self {
        Self {
            state: DialogueState::Init,
            query: query.into(),
            backend_name: backend_name.into(),
            backend_enabled,
            max_clarify_turns: 0,
            turns: 0,
            pending_copy: None,
        }
    }

    /// Bound the clarification loop. 0 keeps it unbounded.
    pub fn with_max_clarify_turns(mut self, max: usize) -> Self {
        self.max_clarify_turns = max;
        self
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// The terminal outcome, if the machine has reached one.
    pub fn into_outcome(self) -> Option<Outcome> {
        match self.state {
            DialogueState::Completed { command } => Some(Outcome::Run(command)),
            DialogueState::Copied { command } => Some(Outcome::Copied(command)),
            DialogueState::Canceled => Some(Outcome::Canceled),
            DialogueState::Error { error } => Some(Outcome::Failed(error)),
            _ => None,
        }
    }

    /// Apply one event and return the effects the driver must execute.
    pub fn handle(&mut self, event: DialogueEvent) -> Vec<Effect> {
        if self.state.is_terminal() {
            // Completions of work started before the terminal transition
            // land here and are dropped (fire-and-forget on cancel).
            tracing::debug!(state = self.state.name(), ?event, "event after terminal state dropped");
            return Vec::new();
        }

        let from = self.state.name();
        let state = std::mem::replace(&mut self.state, DialogueState::Init);
        let (next, effects) = if matches!(event, DialogueEvent::Interrupt) {
            (DialogueState::Canceled, vec![Effect::Quit])
        } else {
            match state {
                DialogueState::Init => self.on_init(event),
                DialogueState::Analyzing { context } => self.on_analyzing(context, event),
                DialogueState::Asking {
                    prompt,
                    context,
                    input,
                } => self.on_asking(prompt, context, input, event),
                DialogueState::Selecting { candidates } => self.on_selecting(candidates, event),
                terminal => (terminal, Vec::new()),
            }
        };
        if from != next.name() {
            tracing::debug!(from, to = next.name(), "dialogue transition");
        }
        self.state = next;
        effects
    }

    fn on_init(&mut self, event: DialogueEvent) -> (DialogueState, Vec<Effect>) {
        match event {
            DialogueEvent::Begin => {
                if !self.backend_enabled {
                    let error = LlmError::auth(format!(
                        "backend {} is not configured",
                        self.backend_name
                    ));
                    return (DialogueState::Error { error }, vec![Effect::Quit]);
                }
                let prompt = build_prompt(&[], &self.query);
                (
                    DialogueState::Analyzing { context: Vec::new() },
                    vec![Effect::Query(prompt)],
                )
            }
            DialogueEvent::Cancel | DialogueEvent::Char('q') => {
                (DialogueState::Canceled, vec![Effect::Quit])
            }
            _ => (DialogueState::Init, Vec::new()),
        }
    }

    fn on_analyzing(
        &mut self,
        context: Vec<String>,
        event: DialogueEvent,
    ) -> (DialogueState, Vec<Effect>) {
        match event {
            DialogueEvent::Reply(Ok(reply)) => {
                if reply.has_ask() {
                    if self.max_clarify_turns > 0 && self.turns >= self.max_clarify_turns {
                        let error = LlmError::general(format!(
                            "no runnable command after {} clarification turns",
                            self.turns
                        ));
                        return (DialogueState::Error { error }, vec![Effect::Quit]);
                    }
                    self.turns += 1;
                    (
                        DialogueState::Asking {
                            prompt: reply.ask,
                            context,
                            input: String::new(),
                        },
                        Vec::new(),
                    )
                } else if reply.has_command() {
                    let candidates = CandidateList::single(Suggestion::new(
                        reply.command,
                        self.backend_name.clone(),
                    ));
                    (DialogueState::Selecting { candidates }, Vec::new())
                } else {
                    let error =
                        LlmError::general("backend produced neither a command nor a question");
                    (DialogueState::Error { error }, vec![Effect::Quit])
                }
            }
            DialogueEvent::Reply(Err(error)) => {
                (DialogueState::Error { error }, vec![Effect::Quit])
            }
            DialogueEvent::Cancel | DialogueEvent::Char('q') => {
                (DialogueState::Canceled, vec![Effect::Quit])
            }
            _ => (DialogueState::Analyzing { context }, Vec::new()),
        }
    }

    fn on_asking(
        &mut self,
        prompt: String,
        mut context: Vec<String>,
        mut input: String,
        event: DialogueEvent,
    ) -> (DialogueState, Vec<Effect>) {
        match event {
            DialogueEvent::Char(c) => {
                input.push(c);
                (
                    DialogueState::Asking {
                        prompt,
                        context,
                        input,
                    },
                    Vec::new(),
                )
            }
            DialogueEvent::Backspace => {
                input.pop();
                (
                    DialogueState::Asking {
                        prompt,
                        context,
                        input,
                    },
                    Vec::new(),
                )
            }
            DialogueEvent::Submit => {
                let answer = input.trim().to_string();
                if answer.is_empty() {
                    // Guard against accidental empty turns.
                    return (
                        DialogueState::Asking {
                            prompt,
                            context,
                            input,
                        },
                        Vec::new(),
                    );
                }
                context.push(format!("{prompt} {answer}"));
                let outgoing = build_prompt(&context, &self.query);
                (
                    DialogueState::Analyzing { context },
                    vec![Effect::Query(outgoing)],
                )
            }
            DialogueEvent::Cancel => (DialogueState::Canceled, vec![Effect::Quit]),
            _ => (
                DialogueState::Asking {
                    prompt,
                    context,
                    input,
                },
                Vec::new(),
            ),
        }
    }

    fn on_selecting(
        &mut self,
        mut candidates: CandidateList,
        event: DialogueEvent,
    ) -> (DialogueState, Vec<Effect>) {
        match event {
            DialogueEvent::CursorUp | DialogueEvent::Char('k') => {
                candidates.move_up();
                (DialogueState::Selecting { candidates }, Vec::new())
            }
            DialogueEvent::CursorDown | DialogueEvent::Char('j') => {
                candidates.move_down();
                (DialogueState::Selecting { candidates }, Vec::new())
            }
            DialogueEvent::Submit => match candidates.selected() {
                Some(choice) => {
                    let command = choice.text.clone();
                    (DialogueState::Completed { command }, vec![Effect::Quit])
                }
                None => (DialogueState::Selecting { candidates }, Vec::new()),
            },
            DialogueEvent::Char('c') => {
                // One write per copy request; repeated presses while the
                // first write is in flight are ignored.
                if self.pending_copy.is_none() {
                    if let Some(choice) = candidates.selected() {
                        let text = choice.text.clone();
                        self.pending_copy = Some(text.clone());
                        return (
                            DialogueState::Selecting { candidates },
                            vec![Effect::CopyToClipboard(text)],
                        );
                    }
                }
                (DialogueState::Selecting { candidates }, Vec::new())
            }
            DialogueEvent::CopyDone(Ok(())) => match self.pending_copy.take() {
                Some(command) => (DialogueState::Copied { command }, vec![Effect::Quit]),
                None => (DialogueState::Selecting { candidates }, Vec::new()),
            },
            DialogueEvent::CopyDone(Err(cause)) => {
                self.pending_copy = None;
                let error = LlmError::general(format!("copy failed: {cause}"));
                (DialogueState::Error { error }, vec![Effect::Quit])
            }
            DialogueEvent::Cancel | DialogueEvent::Char('q') => {
                (DialogueState::Canceled, vec![Effect::Quit])
            }
            _ => (DialogueState::Selecting { candidates }, Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ErrorKind, SmartReply};

    fn started(query: &str) -> Dialogue {
        let mut dialogue = Dialogue::new(query, "openai", true);
        let effects = dialogue.handle(DialogueEvent::Begin);
        assert_eq!(effects, vec![Effect::Query(query.to_string())]);
        dialogue
    }

    fn reply_command(dialogue: &mut Dialogue, command: &str) -> Vec<Effect> {
        dialogue.handle(DialogueEvent::Reply(Ok(SmartReply::command(command))))
    }

    fn reply_ask(dialogue: &mut Dialogue, ask: &str) -> Vec<Effect> {
        dialogue.handle(DialogueEvent::Reply(Ok(SmartReply::ask(ask))))
    }

    fn type_text(dialogue: &mut Dialogue, text: &str) {
        for c in text.chars() {
            dialogue.handle(DialogueEvent::Char(c));
        }
    }

    #[test]
    fn test_begin_queries_backend_with_bare_query() {
        let dialogue = started("ping baidu.com");
        assert_eq!(dialogue.state().name(), "analyzing");
    }

    #[test]
    fn test_disabled_backend_is_an_auth_error_without_a_round_trip() {
        let mut dialogue = Dialogue::new("ls", "openai", false);
        let effects = dialogue.handle(DialogueEvent::Begin);
        assert_eq!(effects, vec![Effect::Quit]);
        match dialogue.state() {
            DialogueState::Error { error } => assert_eq!(error.kind(), ErrorKind::Auth),
            other => panic!("expected error state, got {}", other.name()),
        }
    }

    #[test]
    fn test_command_reply_moves_to_selecting_with_provenance() {
        // Scenario: "ping baidu.com" resolves in one turn.
        let mut dialogue = started("ping baidu.com");
        let effects = reply_command(&mut dialogue, "ping -c 4 baidu.com");
        assert!(effects.is_empty());
        match dialogue.state() {
            DialogueState::Selecting { candidates } => {
                assert_eq!(candidates.len(), 1);
                assert_eq!(candidates.cursor(), 0);
                let choice = candidates.selected().unwrap();
                assert_eq!(choice.text, "ping -c 4 baidu.com");
                assert_eq!(choice.source, "openai");
            }
            other => panic!("expected selecting, got {}", other.name()),
        }

        let effects = dialogue.handle(DialogueEvent::Submit);
        assert_eq!(effects, vec![Effect::Quit]);
        match dialogue.into_outcome() {
            Some(Outcome::Run(command)) => assert_eq!(command, "ping -c 4 baidu.com"),
            other => panic!("expected run outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_ask_reply_collects_answer_into_context_verbatim() {
        // Scenario: the backend asks which file to delete.
        let mut dialogue = started("删除文件");
        reply_ask(&mut dialogue, "你要删除哪个文件?");
        assert_eq!(dialogue.state().name(), "asking");

        type_text(&mut dialogue, "log.txt");
        let effects = dialogue.handle(DialogueEvent::Submit);
        assert_eq!(
            effects,
            vec![Effect::Query("你要删除哪个文件? log.txt 删除文件".to_string())]
        );
        match dialogue.state() {
            DialogueState::Analyzing { context } => {
                assert_eq!(context, &["你要删除哪个文件? log.txt".to_string()]);
            }
            other => panic!("expected analyzing, got {}", other.name()),
        }
    }

    #[test]
    fn test_empty_submit_in_asking_is_a_no_op() {
        let mut dialogue = started("delete a file");
        reply_ask(&mut dialogue, "which file?");

        let effects = dialogue.handle(DialogueEvent::Submit);
        assert!(effects.is_empty());
        assert_eq!(dialogue.state().name(), "asking");

        // Whitespace-only input counts as empty too.
        type_text(&mut dialogue, "   ");
        let effects = dialogue.handle(DialogueEvent::Submit);
        assert!(effects.is_empty());
        assert_eq!(dialogue.state().name(), "asking");
    }

    #[test]
    fn test_backspace_edits_the_answer() {
        let mut dialogue = started("delete a file");
        reply_ask(&mut dialogue, "which file?");
        type_text(&mut dialogue, "logg");
        dialogue.handle(DialogueEvent::Backspace);
        type_text(&mut dialogue, ".txt");
        let effects = dialogue.handle(DialogueEvent::Submit);
        assert_eq!(
            effects,
            vec![Effect::Query("which file? log.txt delete a file".to_string())]
        );
    }

    #[test]
    fn test_context_accumulates_across_turns_oldest_first() {
        let mut dialogue = started("backup");
        reply_ask(&mut dialogue, "backup what?");
        type_text(&mut dialogue, "/etc");
        dialogue.handle(DialogueEvent::Submit);
        reply_ask(&mut dialogue, "to where?");
        type_text(&mut dialogue, "/tmp");
        let effects = dialogue.handle(DialogueEvent::Submit);
        assert_eq!(
            effects,
            vec![Effect::Query("backup what? /etc to where? /tmp backup".to_string())]
        );
    }

    #[test]
    fn test_empty_reply_is_a_general_error() {
        let mut dialogue = started("do something");
        let effects = dialogue.handle(DialogueEvent::Reply(Ok(SmartReply::default())));
        assert_eq!(effects, vec![Effect::Quit]);
        match dialogue.state() {
            DialogueState::Error { error } => {
                assert_eq!(error.kind(), ErrorKind::General);
                assert!(error.message().contains("neither a command nor a question"));
            }
            other => panic!("expected error, got {}", other.name()),
        }
    }

    #[test]
    fn test_backend_failure_carries_its_classification() {
        // Scenario: the backend call exceeds its timeout.
        let mut dialogue = started("slow thing");
        let effects = dialogue.handle(DialogueEvent::Reply(Err(LlmError::timeout(
            "request timed out after 30s",
        ))));
        assert_eq!(effects, vec![Effect::Quit]);
        match dialogue.state() {
            DialogueState::Error { error } => assert_eq!(error.kind(), ErrorKind::Timeout),
            other => panic!("expected error, got {}", other.name()),
        }
    }

    #[test]
    fn test_cursor_moves_clamp_in_selecting() {
        let mut dialogue = started("list files");
        reply_command(&mut dialogue, "ls -la");
        for event in [
            DialogueEvent::CursorUp,
            DialogueEvent::CursorDown,
            DialogueEvent::Char('k'),
            DialogueEvent::Char('j'),
        ] {
            dialogue.handle(event);
            match dialogue.state() {
                DialogueState::Selecting { candidates } => assert_eq!(candidates.cursor(), 0),
                other => panic!("expected selecting, got {}", other.name()),
            }
        }
    }

    #[test]
    fn test_cancel_from_selecting() {
        // Scenario: cancel wins regardless of candidate list contents.
        let mut dialogue = started("list files");
        reply_command(&mut dialogue, "ls -la");
        let effects = dialogue.handle(DialogueEvent::Cancel);
        assert_eq!(effects, vec![Effect::Quit]);
        assert!(matches!(dialogue.into_outcome(), Some(Outcome::Canceled)));
    }

    #[test]
    fn test_q_cancels_in_selecting_but_is_text_in_asking() {
        let mut dialogue = started("quit something");
        reply_ask(&mut dialogue, "quit what?");
        dialogue.handle(DialogueEvent::Char('q'));
        assert_eq!(dialogue.state().name(), "asking");

        let mut dialogue = started("list files");
        reply_command(&mut dialogue, "ls");
        dialogue.handle(DialogueEvent::Char('q'));
        assert_eq!(dialogue.state().name(), "canceled");
    }

    #[test]
    fn test_interrupt_cancels_from_any_state() {
        let setups: [fn(&mut Dialogue); 4] = [
            |_d| {},
            |d| {
                d.handle(DialogueEvent::Begin);
            },
            |d| {
                d.handle(DialogueEvent::Begin);
                d.handle(DialogueEvent::Reply(Ok(SmartReply::ask("which?"))));
            },
            |d| {
                d.handle(DialogueEvent::Begin);
                d.handle(DialogueEvent::Reply(Ok(SmartReply::command("ls"))));
            },
        ];
        for setup in setups {
            let mut dialogue = Dialogue::new("anything", "openai", true);
            setup(&mut dialogue);
            let effects = dialogue.handle(DialogueEvent::Interrupt);
            assert_eq!(effects, vec![Effect::Quit]);
            assert_eq!(dialogue.state().name(), "canceled");
        }
    }

    #[test]
    fn test_stale_reply_after_cancel_is_discarded() {
        let mut dialogue = started("ping something");
        dialogue.handle(DialogueEvent::Interrupt);
        let effects = reply_command(&mut dialogue, "ping -c 4 example.com");
        assert!(effects.is_empty());
        assert_eq!(dialogue.state().name(), "canceled");
    }

    #[test]
    fn test_copy_path_reaches_copied() {
        let mut dialogue = started("disk usage");
        reply_command(&mut dialogue, "df -h");

        let effects = dialogue.handle(DialogueEvent::Char('c'));
        assert_eq!(effects, vec![Effect::CopyToClipboard("df -h".to_string())]);
        assert_eq!(dialogue.state().name(), "selecting");

        // A second press while the write is in flight does nothing.
        let effects = dialogue.handle(DialogueEvent::Char('c'));
        assert!(effects.is_empty());

        let effects = dialogue.handle(DialogueEvent::CopyDone(Ok(())));
        assert_eq!(effects, vec![Effect::Quit]);
        match dialogue.into_outcome() {
            Some(Outcome::Copied(command)) => assert_eq!(command, "df -h"),
            other => panic!("expected copied outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_copy_failure_is_a_general_error() {
        let mut dialogue = started("disk usage");
        reply_command(&mut dialogue, "df -h");
        dialogue.handle(DialogueEvent::Char('c'));
        let effects = dialogue.handle(DialogueEvent::CopyDone(Err("no display".to_string())));
        assert_eq!(effects, vec![Effect::Quit]);
        match dialogue.state() {
            DialogueState::Error { error } => {
                assert_eq!(error.kind(), ErrorKind::General);
                assert!(error.message().contains("copy failed"));
                assert!(error.message().contains("no display"));
            }
            other => panic!("expected error, got {}", other.name()),
        }
    }

    #[test]
    fn test_clarification_turn_cap_when_configured() {
        let mut dialogue = Dialogue::new("vague", "openai", true).with_max_clarify_turns(2);
        dialogue.handle(DialogueEvent::Begin);

        for turn in 0..2 {
            reply_ask(&mut dialogue, "more detail?");
            assert_eq!(dialogue.state().name(), "asking", "turn {turn}");
            type_text(&mut dialogue, "detail");
            dialogue.handle(DialogueEvent::Submit);
        }

        // The third ask exceeds the bound.
        let effects = reply_ask(&mut dialogue, "even more detail?");
        assert_eq!(effects, vec![Effect::Quit]);
        match dialogue.state() {
            DialogueState::Error { error } => {
                assert_eq!(error.kind(), ErrorKind::General);
                assert!(error.message().contains("2 clarification turns"));
            }
            other => panic!("expected error, got {}", other.name()),
        }
    }

    #[test]
    fn test_unbounded_loop_by_default() {
        let mut dialogue = started("vague");
        for _ in 0..10 {
            reply_ask(&mut dialogue, "more?");
            assert_eq!(dialogue.state().name(), "asking");
            type_text(&mut dialogue, "x");
            dialogue.handle(DialogueEvent::Submit);
        }
        reply_command(&mut dialogue, "echo done");
        assert_eq!(dialogue.state().name(), "selecting");
    }

    #[test]
    fn test_build_prompt() {
        assert_eq!(build_prompt(&[], "list files"), "list files");
        let context = vec!["which dir? /tmp".to_string(), "hidden too? yes".to_string()];
        assert_eq!(
            build_prompt(&context, "list files"),
            "which dir? /tmp hidden too? yes list files"
        );
    }
}
