//! Mock HTTP server setup for integration tests

#![allow(dead_code)]

use audiogen::ClientConfig;
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::time::Duration;

pub const GENERATE_PATH: &str = "/api/audio/generate";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Client config pointing at the mock server, with a short timeout
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(&self.base_url)
            .with_timeout(Duration::from_secs(5))
    }

    /// Successful binary audio response for any JSON body matching `body`
    pub async fn mock_audio(&mut self, body: serde_json::Value, audio: &[u8]) -> Mock {
        self.server
            .mock("POST", GENERATE_PATH)
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(body))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(audio)
            .create_async()
            .await
    }

    /// Error response on `path`
    pub async fn mock_error(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "text/plain")
            .with_body(body)
            .create_async()
            .await
    }

    /// JSON response on `path`
    pub async fn mock_json(&mut self, method: &str, path: &str, body: serde_json::Value) -> Mock {
        self.server
            .mock(method, path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }
}

/// Base URL of a listener that accepts connections and never answers.
pub async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

/// Base URL nothing listens on.
pub async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
