//! Ollama `/api/chat` transport.

use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use crate::error::{ExamusError, Result};
use crate::types::ChatRequest;

use super::http::{build_client, json_headers, status_to_error};
use super::{ByteStream, ChatTransport};

/// Default local Ollama address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub struct OllamaTransport {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ExamusError::Configuration("empty Ollama base URL".into()));
        }
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl ChatTransport for OllamaTransport {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream> {
        let url = self.chat_url();
        debug!(
            model = request.model.as_str(),
            messages = request.messages.len(),
            url = url.as_str(),
            "Ollama open_stream"
        );

        let resp = self
            .client
            .post(&url)
            .headers(json_headers())
            .json(request)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let stream = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(ExamusError::Network));
        Ok(Box::pin(stream))
    }
}
