//! Test utilities for integration tests
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, body::Body};

use reviewer::api::AppState;
use reviewer::api::app;
use reviewer::core::{AppConfig, Secret};
use reviewer::gemini::{ChatSession, ModelClient, ModelInvocationError};

/// A model client that answers from a script instead of the network.
/// Every message is recorded along with the size of the history it
/// was sent with. Once the script runs out it echoes a canned reply.
#[derive(Default)]
pub struct StubModelClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    sent: Mutex<Vec<(usize, String)>>,
}

#[allow(dead_code)]
impl StubModelClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_replies(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        let client = Self::default();
        *client.replies.lock().unwrap() = replies
            .into_iter()
            .map(|r| r.map(String::from).map_err(String::from))
            .collect();
        Arc::new(client)
    }

    pub fn sent(&self) -> Vec<(usize, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for StubModelClient {
    async fn send_message(
        &self,
        session: &ChatSession,
        text: &str,
    ) -> Result<String, ModelInvocationError> {
        self.sent
            .lock()
            .unwrap()
            .push((session.history().len(), text.to_string()));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(ModelInvocationError::Remote {
                status: 503,
                message,
            }),
            None => Ok(String::from("Stub reply")),
        }
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        api_key: Secret::new("test-api-key"),
        system_instruction: String::from("You are a code reviewer."),
        model: String::from("gemini-1.5-pro"),
        api_hostname: String::from("http://localhost:9"),
        request_timeout: Duration::from_secs(5),
        session_ttl: Duration::from_secs(60 * 60),
        language: String::from("Python"),
        upload_extension: String::from("py"),
    }
}

/// Creates a test application router backed by `client`.
pub fn test_app(client: Arc<StubModelClient>) -> Router {
    let app_state = AppState::new(test_config(), client);
    app(Arc::new(RwLock::new(app_state)))
}

#[allow(dead_code)]
pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Build a multipart body with an optional session ID and one file.
#[allow(dead_code)]
pub fn multipart_body(
    boundary: &str,
    session_id: Option<&str>,
    file_name: &str,
    contents: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(id) = session_id {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"session_id\"\r\n\r\n{id}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
