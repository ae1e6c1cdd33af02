//! Clipboard seam.
//!
//! Writes are fire-and-forget: callers log failures and move on.

use crate::{Result, StudioError};
use base64::{engine::general_purpose, Engine as _};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Write-only clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

pub type ClipboardPtr = Arc<dyn Clipboard>;

/// Copies through the terminal with an OSC 52 escape sequence.
///
/// Supported by most modern terminal emulators and by tmux with
/// `set-clipboard on`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Osc52Clipboard;

impl Osc52Clipboard {
    /// The escape sequence that places `text` on the system clipboard.
    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", general_purpose::STANDARD.encode(text))
    }
}

impl Clipboard for Osc52Clipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(Self::sequence(text).as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| StudioError::Clipboard(e.to_string()))
    }
}

/// Keeps everything written, newest last.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.writes.lock().ok()?.last().cloned()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        self.writes
            .lock()
            .map_err(|e| StudioError::Clipboard(e.to_string()))?
            .push(text.to_string());
        Ok(())
    }
}
