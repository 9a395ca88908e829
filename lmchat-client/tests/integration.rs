//! Integration tests for the chat client using wiremock.

use futures::StreamExt;
use lmchat_client::{ChatSettings, ClientError, LmChat};
use lmchat_stream::DecoderConfig;
use lmchat_types::{AbortReason, StreamEvent, StreamOutcome};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse_body(contents: &[&str]) -> String {
    let mut body = String::new();
    for content in contents {
        let record = serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
        });
        body.push_str(&format!("data: {record}\n\n"));
    }
    body.push_str("data: {\"id\":\"chatcmpl-123\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n");
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn stream_sends_expected_request_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "messages": [
                {"role": "user", "content": "Why is the sky blue?"},
                {"role": "system", "content": "Answer in five words."}
            ],
            "temperature": 0.7,
            "max_tokens": -1,
            "stream": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body(&["Rayleigh"]), "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = LmChat::new(server.uri()).custom_instructions("Answer in five words.");
    let handle = client
        .stream("Why is the sky blue?", CancellationToken::new())
        .await
        .expect("stream starts");
    let (text, outcome) = handle.collect().await;
    assert_eq!(text, "Rayleigh");
    assert!(outcome.is_completed());
}

#[tokio::test]
async fn stream_concatenates_deltas() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["Hello", ",", " world", "!"]), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let handle = LmChat::new(server.uri())
        .stream("hi", CancellationToken::new())
        .await
        .unwrap();
    let (text, outcome) = handle.collect().await;
    assert_eq!(text, "Hello, world!");
    assert!(outcome.is_completed());
}

#[tokio::test]
async fn response_limit_from_settings_aborts_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body(&["a", "b", "c", "d"]), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let settings = ChatSettings {
        server_address: server.uri(),
        response_limit: 2,
        ..ChatSettings::default()
    };
    let handle = LmChat::from_settings(&settings)
        .stream("hi", CancellationToken::new())
        .await
        .unwrap();
    let (text, outcome) = handle.collect().await;
    assert_eq!(text, "ab");
    assert!(matches!(outcome, StreamOutcome::Aborted(AbortReason::LimitExceeded)));
}

#[tokio::test]
async fn cancel_after_first_delta_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body(&["one", "two"]), "text/event-stream"))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut handle = LmChat::new(server.uri())
        .decoder_config(DecoderConfig::default())
        .stream("hi", cancel.clone())
        .await
        .unwrap();

    let first = handle.receiver.next().await.unwrap();
    assert_eq!(first.as_delta(), Some("one"));
    cancel.cancel();

    let mut rest = Vec::new();
    while let Some(event) = handle.receiver.next().await {
        rest.push(event);
    }
    assert_eq!(rest.len(), 1);
    assert!(matches!(
        rest[0],
        StreamEvent::Finished(StreamOutcome::Aborted(AbortReason::Cancelled))
    ));
}

#[tokio::test]
async fn cancel_before_send_returns_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body(&["x"]), "text/event-stream"))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = LmChat::new(server.uri()).stream("hi", cancel).await.unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
}

#[tokio::test]
async fn http_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let err = LmChat::new(server.uri())
        .stream("hi", CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        ClientError::Http { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = LmChat::new(uri)
        .stream("hi", CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn error_payload_in_stream_yields_no_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"error\":{\"message\":\"context length exceeded\"}}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let handle = LmChat::new(server.uri())
        .stream("hi", CancellationToken::new())
        .await
        .unwrap();
    let (text, outcome) = handle.collect().await;
    assert!(text.is_empty());
    assert!(outcome.is_completed());
}
