//! Shared system prompt for command generation

/// Build the system prompt sent to every backend.
///
/// The prompt pins the reply to a single JSON object with exactly one of
/// `command` or `ask` populated; the dialogue machine depends on that shape.
pub fn system_prompt() -> String {
    let os = std::env::consts::OS;
    format!(
        "You are a {os} command-line expert. From the user's request and the \
         conversation history so far, produce a suitable Bash command.\n\n\
         If you have enough information, reply with JSON {{\"command\": \"...\"}} \
         where command is a Bash command line ready to execute as-is.\n\
         If you need more information, reply with JSON {{\"ask\": \"...\"}} where \
         ask is one specific follow-up question, phrased in the same language \
         the user wrote in.\n\n\
         Rules:\n\
         - reply with exactly one JSON object and no other text\n\
         - populate exactly one of the two fields\n\
         - read the full conversation history; do not re-ask for details the \
         user already gave\n\
         - prefer safe, precise, directly runnable commands"
    )
}
