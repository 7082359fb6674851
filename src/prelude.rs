//! Convenience re-exports for common use.

pub use crate::assembler::{AssembledReply, AssistantView, CallbackView, StreamAssembler};
pub use crate::config::ExamusConfig;
pub use crate::error::{ExamusError, Result};
pub use crate::history::{HistoryObserver, HistoryStore};
pub use crate::provider::{ChatTransport, OllamaTransport};
pub use crate::session::{TurnOutcome, TutorSession};
pub use crate::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use crate::types::{
    ChatMessage, ChatRequest, ContextMode, FragmentParse, FramingMode, GenerationSettings, Message, Role,
    Sender, TurnState,
};
