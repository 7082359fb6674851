//! Streaming types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One JSON object from the `/api/chat` stream.
///
/// Only the fields the client reads are modelled; the rest are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ChunkMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatChunk {
    /// Classify a decoded chunk by what it contributes to the reply.
    pub fn into_parse(self) -> FragmentParse {
        if let Some(error) = self.error {
            return FragmentParse::ServerError(error);
        }
        match self.message.and_then(|m| m.content) {
            Some(text) if !text.is_empty() => FragmentParse::Fragment(text),
            _ => FragmentParse::Ignored,
        }
    }
}

/// Outcome of decoding one piece of the response stream.
///
/// Parse failure is an expected branch, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentParse {
    /// A slice of assistant text.
    Fragment(String),
    /// Valid JSON carrying no text (e.g. the final `done` object).
    Ignored,
    /// The endpoint reported an error object inside the stream.
    ServerError(String),
    /// Data that could not be parsed as a chunk object.
    Malformed(String),
}

/// How the response byte stream is split into JSON values.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FramingMode {
    /// Each network read is parsed as exactly one JSON value; failures drop the read.
    PerChunk,
    /// Reads are buffered and every complete JSON value is parsed as it becomes available.
    #[default]
    Buffered,
}

/// Whether the context window is taken before or after the new user turn is logged.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContextMode {
    /// The window is read after logging the input, so the input closes the
    /// window and is sent again as the final message.
    #[default]
    IncludeInput,
    /// The window is read before logging the input; it is sent once.
    ExcludeInput,
}

/// Lifecycle of one assistant turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TurnState {
    Idle,
    Sending,
    Streaming,
    Completed,
    Failed,
}
