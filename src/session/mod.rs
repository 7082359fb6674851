//! The application root: one history, one assembler, one turn at a time.

use std::sync::Arc;

use tracing::{debug, info};

use crate::assembler::{AssembledReply, AssistantView, StreamAssembler};
use crate::config::ExamusConfig;
use crate::error::Result;
use crate::history::{HistoryStore, RECENT_WINDOW};
use crate::provider::OllamaTransport;
use crate::storage::FileKeyValueStore;
use crate::types::{ContextMode, Sender, TurnState};

/// What a submitted turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: AssembledReply,
    /// The history was shrunk after this turn.
    pub truncated: bool,
}

impl TurnOutcome {
    pub fn state(&self) -> TurnState {
        self.reply.state
    }
}

/// Owns the conversation log and the assembler.
///
/// `submit` borrows the session mutably for the whole turn, so a second
/// submission cannot start while a reply is still streaming.
#[derive(Debug)]
pub struct TutorSession {
    history: HistoryStore,
    assembler: StreamAssembler,
    context: ContextMode,
}

impl TutorSession {
    pub fn new(history: HistoryStore, assembler: StreamAssembler) -> Self {
        Self {
            history,
            assembler,
            context: ContextMode::default(),
        }
    }

    pub fn with_context_mode(mut self, context: ContextMode) -> Self {
        self.context = context;
        self
    }

    pub fn context_mode(&self) -> ContextMode {
        self.context
    }

    /// Wire a session from configuration: file storage under the data dir and
    /// the Ollama transport. Persisted history is restored.
    pub fn from_config(config: &ExamusConfig) -> Result<Self> {
        let storage = Arc::new(FileKeyValueStore::new(config.data_dir.clone()));
        let history = HistoryStore::open(storage)?;
        let transport = Arc::new(OllamaTransport::new(config.base_url.clone())?);
        let assembler = StreamAssembler::new(transport)
            .with_model(config.model.clone())
            .with_system_prompt(config.system_prompt.clone())
            .with_settings(config.settings)
            .with_framing(config.framing);
        info!(
            model = config.model.as_str(),
            base_url = config.base_url.as_str(),
            restored = history.len(),
            "session ready"
        );
        Ok(Self::new(history, assembler).with_context_mode(config.context))
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    pub fn assembler(&self) -> &StreamAssembler {
        &self.assembler
    }

    /// Run one full turn.
    ///
    /// The user turn is logged before the context window is read, unless the
    /// session runs in [`ContextMode::ExcludeInput`].
    ///
    /// Blank input is ignored and returns `Ok(None)`. Connection failures are
    /// stored as the apology reply; only storage failures return `Err`.
    pub async fn submit(
        &mut self,
        input: &str,
        view: &mut dyn AssistantView,
    ) -> Result<Option<TurnOutcome>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let context = match self.context {
            ContextMode::IncludeInput => {
                self.history.append(Sender::User, input)?;
                self.history.recent_window(RECENT_WINDOW)
            }
            ContextMode::ExcludeInput => {
                let window = self.history.recent_window(RECENT_WINDOW);
                self.history.append(Sender::User, input)?;
                window
            }
        };

        let reply = self.assembler.assemble(context, input, view).await;
        self.history.append(Sender::Assistant, reply.text.clone())?;
        let truncated = self.history.maybe_truncate()?;

        debug!(
            state = %reply.state,
            truncated,
            history = self.history.len(),
            "turn finished"
        );
        Ok(Some(TurnOutcome { reply, truncated }))
    }

    /// Clear the whole conversation.
    pub fn clear(&mut self) -> Result<()> {
        self.history.clear()
    }
}
