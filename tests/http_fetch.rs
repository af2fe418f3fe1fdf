//! HTTP fetch tests against a wiremock server

use game_link::http::{FetchOptions, HttpError, RestClient};
use game_link::testing::MockConnector;
use game_link::ws::{ClientConfig, ReconnectingClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReconnectingClient {
    let config = ClientConfig::new("ws://localhost:4242").http_base_url(server.uri());
    ReconnectingClient::with_connector(config, MockConnector::new()).unwrap()
}

#[tokio::test]
async fn test_get_sends_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/state"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"scene": "MainMenu"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client.fetch("/api/state", FetchOptions::default()).await.unwrap();
    assert_eq!(response, json!({"scene": "MainMenu"}));
}

#[tokio::test]
async fn test_post_body_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dialogue"))
        .and(body_json(json!({"choice": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .fetch("/api/dialogue", FetchOptions::post(json!({"choice": 2})))
        .await
        .unwrap();
    assert_eq!(response["ok"], true);
}

#[tokio::test]
async fn test_caller_header_overrides_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/state"))
        .and(header("content-type", "text/plain"))
        .and(header("x-player", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let options = FetchOptions::get()
        .header("Content-Type", "text/plain")
        .unwrap()
        .header("X-Player", "alice")
        .unwrap();

    let client = client_for(&server);
    let response = client.fetch("/api/state", options).await.unwrap();
    assert_eq!(response, json!([]));
}

#[tokio::test]
async fn test_error_status_json_body_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad name"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .fetch("/api/login", FetchOptions::post(json!({"name": ""})))
        .await
        .unwrap();
    assert_eq!(response, json!({"error": "bad name"}));
}

#[tokio::test]
async fn test_error_status_without_json_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(path("/api/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .fetch("/api/broken", FetchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Request(_)));
}

#[tokio::test]
async fn test_non_json_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(path("/api/text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .fetch("/api/text", FetchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Request(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_an_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RestClient::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    let err = client.fetch("/api/state", FetchOptions::default()).await.unwrap_err();
    assert!(matches!(err, HttpError::Request(_)));
}

#[tokio::test]
async fn test_fetch_does_not_touch_websocket() {
    let server = MockServer::start().await;
    Mock::given(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let connector = MockConnector::new();
    let config = ClientConfig::new("ws://localhost:4242").http_base_url(server.uri());
    let client = ReconnectingClient::with_connector(config, connector.clone()).unwrap();

    client.fetch("/health", FetchOptions::default()).await.unwrap();
    assert_eq!(connector.attempts(), 0);
    assert!(!client.is_connected());
}
