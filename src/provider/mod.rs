//! Transport to the inference endpoint.

pub mod http;
pub mod ollama;

pub use ollama::OllamaTransport;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::types::ChatRequest;

/// Raw response body, read by the assembler one network chunk at a time.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Something that can send a chat request and hand back the streamed body.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Send the request. An `Err` here means nothing was received.
    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream>;
}
