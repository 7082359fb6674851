//! Bounded, persisted conversation log.
//!
//! The store appends freely and keeps a running `count` of appends. Once the
//! count reaches [`TRUNCATION_THRESHOLD`], [`HistoryStore::maybe_truncate`]
//! shrinks the log to its last [`RETAINED_AFTER_TRUNCATION`] messages and
//! resets the count to the new length. Every mutation writes both the log and
//! the count back to the [`KeyValueStore`].

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::persona;
use crate::storage::KeyValueStore;
use crate::types::{ChatMessage, Message, Sender};

/// Storage key of the serialized message list.
pub const HISTORY_KEY: &str = "examusChatHistory";
/// Storage key of the running message count.
pub const COUNT_KEY: &str = "examusMessageCount";
/// Count at which the log is shrunk.
pub const TRUNCATION_THRESHOLD: usize = 15;
/// Messages kept after a truncation.
pub const RETAINED_AFTER_TRUNCATION: usize = 3;
/// Prior messages sent as context with each request (10 including the new turn).
pub const RECENT_WINDOW: usize = 9;

/// Hooks the presentation layer can use to follow log changes.
pub trait HistoryObserver: Send + Sync {
    /// The log length changed through an append.
    fn on_changed(&self, _len: usize) {}
    /// The log was shrunk; `retained` messages are left.
    fn on_truncated(&self, _retained: usize) {}
    /// The log was cleared on request.
    fn on_cleared(&self) {}
}

/// Single source of truth for the conversation log.
pub struct HistoryStore {
    messages: Vec<Message>,
    count: usize,
    storage: Arc<dyn KeyValueStore>,
    observer: Option<Box<dyn HistoryObserver>>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("messages", &self.messages.len())
            .field("count", &self.count)
            .field("observer", &self.observer.as_ref().map(|_| ".."))
            .finish()
    }
}

impl HistoryStore {
    /// Create an empty store without reading persisted state.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            messages: Vec::new(),
            count: 0,
            storage,
            observer: None,
        }
    }

    /// Create a store and restore whatever is persisted.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let mut store = Self::new(storage);
        store.restore()?;
        Ok(store)
    }

    pub fn with_observer(mut self, observer: Box<dyn HistoryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<Box<dyn HistoryObserver>>) {
        self.observer = observer;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Append a message stamped now and persist.
    pub fn append(&mut self, sender: Sender, content: impl Into<String>) -> Result<()> {
        self.push(Message::now(sender, content))
    }

    /// Append an already-built message and persist.
    pub fn push(&mut self, message: Message) -> Result<()> {
        self.messages.push(message);
        self.count += 1;
        self.persist()?;
        if let Some(observer) = &self.observer {
            observer.on_changed(self.messages.len());
        }
        Ok(())
    }

    /// The last `max_turns` messages as request context.
    pub fn recent_window(&self, max_turns: usize) -> Vec<ChatMessage> {
        self.recent(max_turns)
            .iter()
            .map(Message::to_chat_message)
            .collect()
    }

    /// Shrink the log once the count reaches the threshold.
    ///
    /// Returns `true` when a truncation happened.
    pub fn maybe_truncate(&mut self) -> Result<bool> {
        if self.count < TRUNCATION_THRESHOLD {
            return Ok(false);
        }
        let start = self
            .messages
            .len()
            .saturating_sub(RETAINED_AFTER_TRUNCATION);
        self.messages.drain(..start);
        self.count = self.messages.len();
        self.persist()?;
        debug!(retained = self.count, "history truncated");
        if let Some(observer) = &self.observer {
            observer.on_truncated(self.count);
        }
        Ok(true)
    }

    /// Drop every message and the persisted state.
    pub fn clear(&mut self) -> Result<()> {
        self.messages.clear();
        self.count = 0;
        self.storage.remove(HISTORY_KEY)?;
        self.storage.remove(COUNT_KEY)?;
        debug!("history cleared");
        if let Some(observer) = &self.observer {
            observer.on_cleared();
        }
        Ok(())
    }

    /// Load the log and count from storage.
    ///
    /// A missing or unreadable count falls back to the log length. Nothing
    /// persisted leaves the store empty.
    pub fn restore(&mut self) -> Result<()> {
        let Some(raw) = self.storage.get(HISTORY_KEY)? else {
            self.messages.clear();
            self.count = 0;
            return Ok(());
        };
        let messages: Vec<Message> = serde_json::from_str(&raw)?;
        let count = self
            .storage
            .get(COUNT_KEY)?
            .and_then(|c| c.trim().parse::<usize>().ok())
            .unwrap_or(messages.len());
        debug!(messages = messages.len(), count, "history restored");
        self.messages = messages;
        self.count = count;
        Ok(())
    }

    /// Render the whole log for the history view.
    pub fn transcript(&self) -> String {
        if self.messages.is_empty() {
            return persona::EMPTY_HISTORY.to_string();
        }
        let mut out = String::new();
        for (i, msg) in self.messages.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(
                out,
                "{}  [{}]\n{}",
                persona::display_name(msg.sender),
                msg.timestamp,
                msg.content
            );
        }
        out
    }

    fn persist(&self) -> Result<()> {
        let serialized = serde_json::to_string(&self.messages)?;
        self.storage.set(HISTORY_KEY, &serialized)?;
        self.storage.set(COUNT_KEY, &self.count.to_string())?;
        Ok(())
    }
}
