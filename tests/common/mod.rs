//! Shared test helpers and a scripted transport.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use examus::assembler::{AssistantView, StreamAssembler};
use examus::error::{ExamusError, Result};
use examus::history::HistoryStore;
use examus::provider::{ByteStream, ChatTransport};
use examus::session::TutorSession;
use examus::storage::KeyValueStore;
use examus::types::{ChatRequest, TurnState};

/// How the transport answers one request.
pub enum Reply {
    /// Stream these reads in order.
    Chunks(Vec<String>),
    /// Fail before any byte arrives.
    Refuse,
}

impl Reply {
    pub fn chunks(reads: &[&str]) -> Self {
        Self::Chunks(reads.iter().map(|r| r.to_string()).collect())
    }
}

/// A transport that replays queued replies and records every request.
pub struct ScriptedTransport {
    replies: Mutex<Vec<Reply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply streamed as one NDJSON line per word.
    pub fn queue_text(&self, text: &str) {
        let chunks = text
            .split_inclusive(' ')
            .map(|word| {
                let line = serde_json::json!({
                    "message": {"role": "assistant", "content": word},
                    "done": false
                });
                format!("{line}\n")
            })
            .chain(std::iter::once("{\"done\":true}\n".to_string()))
            .collect();
        self.queue(Reply::Chunks(chunks));
    }

    pub fn queue(&self, reply: Reply) {
        self.replies.lock().unwrap().push(reply);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Reply::chunks(&["{\"message\":{\"content\":\"ok\"}}\n"])
            } else {
                replies.remove(0)
            }
        };
        match reply {
            Reply::Chunks(chunks) => {
                let items: Vec<Result<Bytes>> = chunks
                    .into_iter()
                    .map(|c| Ok(Bytes::from(c)))
                    .collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Reply::Refuse => Err(ExamusError::Stream("connection refused".into())),
        }
    }
}

/// Records everything the assembler shows.
#[derive(Default)]
pub struct RecordingView {
    pub states: Vec<TurnState>,
    pub texts: Vec<String>,
    pub finals: Vec<String>,
}

impl AssistantView for RecordingView {
    fn on_state(&mut self, state: TurnState) {
        self.states.push(state);
    }

    fn on_text(&mut self, text: &str) {
        self.texts.push(text.to_string());
    }

    fn on_final(&mut self, text: &str) {
        self.finals.push(text.to_string());
    }
}

/// A session over the given storage and a fresh scripted transport.
pub fn scripted_session(
    storage: Arc<dyn KeyValueStore>,
) -> (Arc<ScriptedTransport>, TutorSession) {
    let transport = Arc::new(ScriptedTransport::new());
    let history = HistoryStore::open(storage).expect("restore history");
    let assembler = StreamAssembler::new(transport.clone());
    (transport, TutorSession::new(history, assembler))
}
