//! System clipboard access
//!
//! Uses the `arboard` crate for cross-platform clipboard writes. Called off
//! the event loop (blocking task) because clipboard backends may block.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Write text to the system clipboard.
pub fn copy(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("clipboard is not available")?;
    clipboard
        .set_text(text.to_string())
        .context("failed to write to the clipboard")?;
    Ok(())
}
