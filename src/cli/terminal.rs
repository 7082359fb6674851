//! Terminal rendering of replies and history.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::assembler::AssistantView;
use crate::history::{HistoryObserver, HistoryStore};
use crate::persona::{self, GREETING, THINKING, TRUNCATION_NOTICE};
use crate::types::{Message, Sender, TurnState};

/// Messages replayed when a session starts.
pub const STARTUP_REPLAY: usize = 5;

const CLEAR_LINE: &str = "\r\x1b[2K";

/// Streams a growing reply to a writer, printing only what is new.
pub struct TerminalView<W: Write + Send> {
    out: W,
    shown: String,
    header: bool,
    indicator: bool,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: String::new(),
            header: false,
            indicator: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn begin_reply(&mut self) {
        if self.header {
            return;
        }
        if self.indicator {
            let _ = write!(self.out, "{CLEAR_LINE}");
            self.indicator = false;
        }
        let _ = write!(self.out, "{}: ", persona::display_name(Sender::Assistant));
        self.header = true;
    }

    fn show(&mut self, text: &str) {
        self.begin_reply();
        if let Some(new) = text.strip_prefix(self.shown.as_str()) {
            let _ = write!(self.out, "{new}");
        } else {
            // The reply was replaced (e.g. by the connection error); start a fresh line.
            let _ = write!(self.out, "\n{text}");
        }
        self.shown.clear();
        self.shown.push_str(text);
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> AssistantView for TerminalView<W> {
    fn on_state(&mut self, state: TurnState) {
        match state {
            TurnState::Sending => {
                let _ = write!(
                    self.out,
                    "{}: {THINKING}",
                    persona::display_name(Sender::Assistant)
                );
                let _ = self.out.flush();
                self.indicator = true;
            }
            TurnState::Streaming | TurnState::Failed => self.begin_reply(),
            TurnState::Idle | TurnState::Completed => {}
        }
    }

    fn on_text(&mut self, text: &str) {
        self.show(text);
    }

    fn on_final(&mut self, text: &str) {
        if text != self.shown {
            self.show(text);
        } else {
            self.begin_reply();
        }
        let _ = writeln!(self.out);
        let _ = self.out.flush();
        self.shown.clear();
        self.header = false;
        self.indicator = false;
    }
}

/// One message as a chat line.
pub fn render_line(message: &Message) -> String {
    format!(
        "{}: {}",
        persona::display_name(message.sender),
        message.content
    )
}

/// What to show when a session opens: the greeting, or the latest messages.
pub fn startup_banner(history: &HistoryStore) -> String {
    if history.is_empty() {
        return greeting_line();
    }
    history
        .recent(STARTUP_REPLAY)
        .iter()
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn greeting_line() -> String {
    format!("{}: {GREETING}", persona::display_name(Sender::Assistant))
}

/// A history event worth telling the user about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Truncated,
    Cleared,
}

/// History observer that queues notices until the terminal prints them.
///
/// Clones share the queue, so one clone can be installed on the history while
/// the loop keeps the other.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    pending: Arc<Mutex<Vec<Notice>>>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notice>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lock())
    }

    /// Print and forget everything queued.
    pub fn flush<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for notice in self.take() {
            match notice {
                Notice::Truncated => writeln!(out, "⚠️  {TRUNCATION_NOTICE}")?,
                Notice::Cleared => writeln!(out, "{}", greeting_line())?,
            }
        }
        Ok(())
    }
}

impl HistoryObserver for Notices {
    fn on_truncated(&self, _retained: usize) {
        self.lock().push(Notice::Truncated);
    }

    fn on_cleared(&self) {
        self.lock().push(Notice::Cleared);
    }
}
