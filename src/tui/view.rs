//! Pure rendering of the dialogue state
//!
//! One function from a machine snapshot to styled text. No mutation, no I/O;
//! the event loop hands the result to ratatui as-is, and tests assert on the
//! flattened string.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::dialogue::{Dialogue, DialogueState};

const SELECTING_HELP: &str = "↑/↓ or k/j: select · Enter: run · c: copy · q/Esc: quit";
const ASKING_HELP: &str = "Enter: submit · Esc: cancel";

fn title_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

fn selected_style() -> Style {
    Style::default()
        .fg(Color::LightMagenta)
        .add_modifier(Modifier::BOLD)
}

fn faint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn error_style() -> Style {
    Style::default().fg(Color::Red)
}

fn success_style() -> Style {
    Style::default().fg(Color::Green)
}

/// Render the current dialogue state to displayable text.
pub fn view(dialogue: &Dialogue, spinner: char) -> Text<'static> {
    match dialogue.state() {
        DialogueState::Init => Text::from(vec![
            Line::from(Span::styled("termi", title_style())),
            Line::default(),
            Line::from(format!("{spinner} starting...")),
        ]),
        DialogueState::Analyzing { .. } => Text::from(vec![
            Line::from(Span::styled("Thinking", title_style())),
            Line::default(),
            Line::from(vec![
                Span::raw(format!("{spinner} analyzing your request: ")),
                Span::styled(
                    dialogue.query().to_string(),
                    Style::default().add_modifier(Modifier::ITALIC),
                ),
            ]),
            Line::default(),
            Line::from(Span::styled("this may take a moment...", faint_style())),
        ]),
        DialogueState::Asking {
            prompt,
            context,
            input,
        } => asking_view(dialogue.query(), prompt, context, input),
        DialogueState::Selecting { candidates } => {
            let mut lines = vec![
                Line::from(Span::styled("Pick a command to run:", title_style())),
                Line::default(),
            ];
            for (i, item) in candidates.items().iter().enumerate() {
                let tag = Span::styled(format!("[{}]", item.source), faint_style());
                if i == candidates.cursor() {
                    lines.push(Line::from(vec![
                        Span::styled("➜ ", selected_style()),
                        Span::styled(item.text.clone(), selected_style()),
                        Span::raw(" "),
                        tag,
                    ]));
                } else {
                    lines.push(Line::from(vec![
                        Span::raw("  "),
                        Span::raw(item.text.clone()),
                        Span::raw(" "),
                        tag,
                    ]));
                }
            }
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(SELECTING_HELP, faint_style())));
            Text::from(lines)
        }
        DialogueState::Completed { command } => Text::from(vec![Line::from(vec![
            Span::styled("✓ ", success_style()),
            Span::raw(format!("running: {command}")),
        ])]),
        DialogueState::Copied { command } => Text::from(vec![Line::from(vec![
            Span::styled("✓ ", success_style()),
            Span::raw(format!("copied to clipboard: {command}")),
        ])]),
        DialogueState::Error { error } => Text::from(vec![
            Line::from(Span::styled(
                "Error",
                error_style().add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(
                error.user_message().to_string(),
                error_style(),
            )),
        ]),
        DialogueState::Canceled => Text::from(vec![Line::from(Span::styled(
            "Canceled.",
            faint_style(),
        ))]),
    }
}

fn asking_view(query: &str, prompt: &str, context: &[String], input: &str) -> Text<'static> {
    let mut lines = vec![Line::from(vec![
        Span::styled("Request: ", title_style()),
        Span::styled(
            query.to_string(),
            Style::default().add_modifier(Modifier::ITALIC),
        ),
    ])];

    if !context.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("so far:", faint_style())));
        for (i, entry) in context.iter().enumerate() {
            lines.push(Line::from(Span::styled(
                format!("{}. {entry}", i + 1),
                faint_style(),
            )));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("? ", title_style()),
        Span::raw(prompt.to_string()),
    ]));
    lines.push(Line::from(format!("> {input}█")));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(ASKING_HELP, faint_style())));
    Text::from(lines)
}
