//! Terminal UI for the clarification dialogue
//!
//! A single cooperative event loop built on ratatui/crossterm. All dialogue
//! mutation happens here, one event at a time: terminal keys, spinner ticks
//! and completions of background tasks are funneled through the reducer in
//! arrival order. Backend calls and the clipboard write run as spawned tasks
//! that report back over an mpsc channel, so the spinner keeps animating
//! while they are outstanding.

mod view;

use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::clipboard;
use crate::dialogue::{Dialogue, DialogueEvent, Effect, Outcome};
use crate::llm::{LlmError, LlmProvider, SmartReply};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
/// Interval between spinner frame updates (milliseconds)
const SPINNER_INTERVAL_MS: u64 = 80;
/// How long one poll for terminal input may block the loop
const POLL_TIMEOUT_MS: u64 = 50;

/// Completions delivered back into the event loop by background tasks
enum AsyncEvent {
    Reply(Result<SmartReply, LlmError>),
    CopyDone(Result<(), String>),
}

/// Drive one query through the dialogue to its terminal outcome.
pub async fn run_dialogue(
    query: String,
    provider: Arc<dyn LlmProvider>,
    max_clarify_turns: usize,
) -> Result<Outcome> {
    let mut dialogue = Dialogue::new(query, provider.name(), provider.enabled())
        .with_max_clarify_turns(max_clarify_turns);
    let (tx, mut rx) = mpsc::channel::<AsyncEvent>(16);

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut dialogue, &provider, &tx, &mut rx).await;
    restore_terminal(&mut terminal)?;
    result?;

    dialogue
        .into_outcome()
        .context("dialogue ended without reaching an outcome")
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    dialogue: &mut Dialogue,
    provider: &Arc<dyn LlmProvider>,
    tx: &mpsc::Sender<AsyncEvent>,
    rx: &mut mpsc::Receiver<AsyncEvent>,
) -> Result<()> {
    let mut spinner_frame = 0usize;
    let mut spinner_last = Instant::now();

    let effects = dialogue.handle(DialogueEvent::Begin);
    let mut should_quit = execute_effects(effects, provider, tx);

    while !should_quit {
        terminal.draw(|frame| {
            let text = view::view(dialogue, SPINNER_FRAMES[spinner_frame]);
            let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
            frame.render_widget(paragraph, frame.area());
        })?;

        // Background completions first, in arrival order.
        while let Ok(async_event) = rx.try_recv() {
            let event = match async_event {
                AsyncEvent::Reply(result) => DialogueEvent::Reply(result),
                AsyncEvent::CopyDone(result) => DialogueEvent::CopyDone(result),
            };
            should_quit |= execute_effects(dialogue.handle(event), provider, tx);
        }
        if should_quit {
            break;
        }

        if event::poll(Duration::from_millis(POLL_TIMEOUT_MS))? {
            if let TermEvent::Key(key) = event::read()? {
                if let Some(event) = map_key(key) {
                    should_quit |= execute_effects(dialogue.handle(event), provider, tx);
                }
            }
        }

        if spinner_last.elapsed() >= Duration::from_millis(SPINNER_INTERVAL_MS) {
            spinner_frame = (spinner_frame + 1) % SPINNER_FRAMES.len();
            spinner_last = Instant::now();
        }

        // Let spawned tasks make progress between polls.
        tokio::task::yield_now().await;
    }

    Ok(())
}

/// Execute the effects of one transition. Returns true when the loop should
/// stop.
fn execute_effects(
    effects: Vec<Effect>,
    provider: &Arc<dyn LlmProvider>,
    tx: &mpsc::Sender<AsyncEvent>,
) -> bool {
    let mut quit = false;
    for effect in effects {
        match effect {
            Effect::Query(prompt) => {
                let provider = Arc::clone(provider);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = provider.ask_smart(&prompt).await;
                    let _ = tx.send(AsyncEvent::Reply(result)).await;
                });
            }
            Effect::CopyToClipboard(text) => {
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let result = clipboard::copy(&text).map_err(|e| e.to_string());
                    let _ = tx.blocking_send(AsyncEvent::CopyDone(result));
                });
            }
            Effect::Quit => quit = true,
        }
    }
    quit
}

/// Translate one terminal key press into a dialogue event.
///
/// Only key-level translation happens here; whether a character is text
/// input or a binding is the machine's per-state decision.
fn map_key(key: KeyEvent) -> Option<DialogueEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(DialogueEvent::Interrupt),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Enter => Some(DialogueEvent::Submit),
        KeyCode::Esc => Some(DialogueEvent::Cancel),
        KeyCode::Up => Some(DialogueEvent::CursorUp),
        KeyCode::Down => Some(DialogueEvent::CursorDown),
        KeyCode::Backspace => Some(DialogueEvent::Backspace),
        KeyCode::Char(c) => Some(DialogueEvent::Char(c)),
        _ => None,
    }
}

/// Install a panic hook that restores the terminal before panicking
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal_static();
        original_hook(panic_info);
    }));
}

fn restore_terminal_static() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
