//! Stream assembler: one user turn in, one assistant reply out.
//!
//! The assembler builds the chat request, opens the response stream through a
//! [`ChatTransport`], and folds every parsed fragment into a growing reply. The
//! running text is handed to an [`AssistantView`] after each fragment, so the
//! display grows as the model writes. A connection failure never surfaces as
//! an `Err`: the reply becomes [`CONNECTION_ERROR_MESSAGE`] and the turn ends
//! in [`TurnState::Failed`].

pub mod decode;

pub use decode::{fragments, FrameDecoder, Utf8Decoder};

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::persona::{CONNECTION_ERROR_MESSAGE, SYSTEM_PROMPT};
use crate::provider::ChatTransport;
use crate::types::{
    ChatMessage, ChatRequest, FragmentParse, FramingMode, GenerationSettings, TurnState,
};

/// Default model served by the local endpoint.
pub const DEFAULT_MODEL: &str = "gemma3:1b";

/// Presentation side of a turn.
pub trait AssistantView: Send {
    /// The turn moved to a new state.
    fn on_state(&mut self, _state: TurnState) {}
    /// The full assistant text so far; called after every fragment.
    fn on_text(&mut self, text: &str);
    /// The final text, called exactly once per turn.
    fn on_final(&mut self, _text: &str) {}
}

/// Adapts a plain `FnMut(&str)` display callback.
pub struct CallbackView<F>(pub F);

impl<F> AssistantView for CallbackView<F>
where
    F: FnMut(&str) + Send,
{
    fn on_text(&mut self, text: &str) {
        (self.0)(text)
    }
}

/// A view that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl AssistantView for NullView {
    fn on_text(&mut self, _text: &str) {}
}

/// Result of one assembled turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledReply {
    /// Text to store as the assistant message.
    pub text: String,
    /// `Completed` or `Failed`.
    pub state: TurnState,
    /// Fragments that contributed text.
    pub fragments: usize,
    /// Pieces of the stream that could not be parsed.
    pub dropped: usize,
    /// Why the turn failed, if it did.
    pub error: Option<String>,
}

impl AssembledReply {
    fn failed(error: String) -> Self {
        Self {
            text: CONNECTION_ERROR_MESSAGE.to_string(),
            state: TurnState::Failed,
            fragments: 0,
            dropped: 0,
            error: Some(error),
        }
    }
}

pub struct StreamAssembler {
    transport: Arc<dyn ChatTransport>,
    model: String,
    system_prompt: String,
    settings: GenerationSettings,
    framing: FramingMode,
}

impl std::fmt::Debug for StreamAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamAssembler")
            .field("model", &self.model)
            .field("transport", &self.transport.name())
            .field("framing", &self.framing)
            .finish()
    }
}

impl StreamAssembler {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            settings: GenerationSettings::default(),
            framing: FramingMode::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_framing(mut self, framing: FramingMode) -> Self {
        self.framing = framing;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn framing(&self) -> FramingMode {
        self.framing
    }

    /// Build the request for `input` with `context` as prior turns.
    pub fn build_request(&self, context: Vec<ChatMessage>, input: &str) -> ChatRequest {
        ChatRequest::new(
            self.model.clone(),
            &self.system_prompt,
            context,
            input,
            self.settings,
        )
    }

    /// Run one turn to completion or failure.
    pub async fn assemble(
        &self,
        context: Vec<ChatMessage>,
        input: &str,
        view: &mut dyn AssistantView,
    ) -> AssembledReply {
        let request = self.build_request(context, input);
        view.on_state(TurnState::Sending);

        let body = match self.transport.open_stream(&request).await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    transport = self.transport.name(),
                    category = ?e.category(),
                    connection = e.is_connection_failure(),
                    error = %e,
                    "chat request failed"
                );
                return self.finish_failed(e.to_string(), view);
            }
        };

        view.on_state(TurnState::Streaming);
        let mut parsed = fragments(body, self.framing);
        let mut text = String::new();
        let mut count = 0;
        let mut dropped = 0;

        while let Some(item) = parsed.next().await {
            match item {
                Ok(FragmentParse::Fragment(piece)) => {
                    text.push_str(&piece);
                    count += 1;
                    view.on_text(&text);
                }
                Ok(FragmentParse::Ignored) => {}
                Ok(FragmentParse::ServerError(message)) => {
                    warn!(error = message.as_str(), "endpoint reported an error mid-stream");
                }
                Ok(FragmentParse::Malformed(reason)) => {
                    dropped += 1;
                    debug!(reason = reason.as_str(), "skipping malformed fragment");
                }
                Err(e) => {
                    warn!(
                        category = ?e.category(),
                        error = %e,
                        received = text.len(),
                        "response stream broke"
                    );
                    return self.finish_failed(e.to_string(), view);
                }
            }
        }

        debug!(fragments = count, dropped, chars = text.len(), "reply complete");
        view.on_state(TurnState::Completed);
        view.on_final(&text);
        AssembledReply {
            text,
            state: TurnState::Completed,
            fragments: count,
            dropped,
            error: None,
        }
    }

    fn finish_failed(&self, error: String, view: &mut dyn AssistantView) -> AssembledReply {
        let reply = AssembledReply::failed(error);
        view.on_state(TurnState::Failed);
        view.on_text(&reply.text);
        view.on_final(&reply.text);
        reply
    }
}
