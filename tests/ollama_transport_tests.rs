//! The Ollama transport against a mock `/api/chat` endpoint.

use std::sync::Arc;

use examus::assembler::{NullView, StreamAssembler};
use examus::error::ExamusError;
use examus::history::HistoryStore;
use examus::persona::CONNECTION_ERROR_MESSAGE;
use examus::provider::{ChatTransport, OllamaTransport};
use examus::session::TutorSession;
use examus::storage::MemoryKeyValueStore;
use examus::types::{ChatMessage, ChatRequest, FramingMode, GenerationSettings, TurnState};
use futures::StreamExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NDJSON_REPLY: &str = concat!(
    "{\"model\":\"gemma3:1b\",\"message\":{\"role\":\"assistant\",\"content\":\"Cells \"},\"done\":false}\n",
    "{\"model\":\"gemma3:1b\",\"message\":{\"role\":\"assistant\",\"content\":\"divide.\"},\"done\":false}\n",
    "{\"model\":\"gemma3:1b\",\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
);

fn ndjson(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/x-ndjson")
}

fn session_for(base_url: &str, framing: FramingMode) -> TutorSession {
    let transport = Arc::new(OllamaTransport::new(base_url).unwrap());
    let history = HistoryStore::new(Arc::new(MemoryKeyValueStore::new()));
    let assembler = StreamAssembler::new(transport).with_framing(framing);
    TutorSession::new(history, assembler)
}

#[tokio::test]
async fn streams_reply_from_chat_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("content-type", "application/json"))
        .respond_with(ndjson(NDJSON_REPLY))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri(), FramingMode::Buffered);
    let outcome = session
        .submit("How do cells grow?", &mut NullView)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.state(), TurnState::Completed);
    assert_eq!(outcome.reply.text, "Cells divide.");
    assert_eq!(outcome.reply.fragments, 2);
    assert_eq!(session.history().messages()[1].content, "Cells divide.");
}

#[tokio::test]
async fn per_chunk_framing_handles_single_object_reads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ndjson(
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Yes.\"},\"done\":true}",
        ))
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri(), FramingMode::PerChunk);
    let outcome = session.submit("ready?", &mut NullView).await.unwrap().unwrap();
    assert_eq!(outcome.reply.text, "Yes.");
}

#[tokio::test]
async fn request_body_carries_model_messages_and_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "model": "gemma3:1b",
            "stream": true,
            "max_tokens": 1000,
            "options": {"num_predict": 1000}
        })))
        .respond_with(ndjson(NDJSON_REPLY))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri(), FramingMode::Buffered);
    session.submit("hello", &mut NullView).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "system");
    for message in &messages[1..] {
        assert_eq!(message["role"], "user");
        assert_eq!(message["content"], "hello");
    }
    assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-9);
}

#[tokio::test]
async fn error_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"error": "model 'nope' not found"})),
        )
        .mount(&server)
        .await;

    let transport = OllamaTransport::new(server.uri()).unwrap();
    let request = ChatRequest::new(
        "nope",
        "system",
        Vec::<ChatMessage>::new(),
        "hi",
        GenerationSettings::default(),
    );
    let err = match transport.open_stream(&request).await {
        Ok(_) => panic!("expected an error"),
        Err(e) => e,
    };
    match err {
        ExamusError::Api { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("not found"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_status_yields_apology_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = session_for(&server.uri(), FramingMode::Buffered);
    let outcome = session.submit("hi", &mut NullView).await.unwrap().unwrap();
    assert_eq!(outcome.state(), TurnState::Failed);
    assert_eq!(outcome.reply.text, CONNECTION_ERROR_MESSAGE);
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn unreachable_endpoint_yields_apology_turn() {
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let mut session = session_for(&uri, FramingMode::Buffered);
    let outcome = session.submit("hi", &mut NullView).await.unwrap().unwrap();
    assert_eq!(outcome.state(), TurnState::Failed);
    assert_eq!(session.history().messages()[1].content, CONNECTION_ERROR_MESSAGE);
}

#[tokio::test]
async fn raw_stream_yields_body_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ndjson(NDJSON_REPLY))
        .mount(&server)
        .await;

    let transport = OllamaTransport::new(format!("{}/", server.uri())).unwrap();
    let request = ChatRequest::new(
        "gemma3:1b",
        "system",
        Vec::new(),
        "hi",
        GenerationSettings::default(),
    );
    let mut stream = transport.open_stream(&request).await.unwrap();
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(String::from_utf8(body).unwrap(), NDJSON_REPLY);
}
