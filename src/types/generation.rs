//! Generation settings and the chat request body.

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::message::ChatMessage;

/// Default cap on reply length.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Settings controlling text generation.
#[derive(Debug, Clone, Copy, Builder, Serialize, Deserialize, PartialEq)]
pub struct GenerationSettings {
    #[builder(default = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
    #[builder(default = DEFAULT_TEMPERATURE)]
    pub temperature: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Body of `POST /api/chat`.
///
/// `max_tokens` and `temperature` sit at the top level for compatibility with
/// the original wire shape; `options` carries the same values in the form
/// Ollama actually reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub stream: bool,
    pub options: ChatOptions,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChatOptions {
    pub num_predict: u32,
    pub temperature: f64,
}

impl ChatRequest {
    /// Assemble a streaming request: preamble, prior context, then the new turn.
    pub fn new(
        model: impl Into<String>,
        system_prompt: &str,
        context: Vec<ChatMessage>,
        input: &str,
        settings: GenerationSettings,
    ) -> Self {
        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(context);
        messages.push(ChatMessage::user(input));
        Self {
            model: model.into(),
            messages,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            stream: true,
            options: ChatOptions {
                num_predict: settings.max_tokens,
                temperature: settings.temperature,
            },
        }
    }
}
