use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::ai::chat::models::Turn;
use crate::core::{AppConfig, Secret};

// Gemini represents every message as a role plus a list of parts:
//
// {
//   "role": "model",
//   "parts": [{"text": "The function never closes the file..."}]
// }
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Content::new(turn.role().as_str(), turn.content())
    }
}

/// A conversation context seeded with prior turns. Sessions live only
/// on this side of the wire; the full history is sent with every
/// message.
#[derive(Clone, Debug, Default)]
pub struct ChatSession {
    history: Vec<Content>,
}

impl ChatSession {
    pub fn new(history: Vec<Content>) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }
}

#[derive(Error, Debug)]
pub enum ModelInvocationError {
    #[error("Request to the model service failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Model service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Malformed response from the model service: {0}")]
    Malformed(String),
}

/// Everything the rest of the app needs from a hosted chat model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Start a conversation context from the prior turns. No network
    /// calls are made.
    fn create_session(&self, history: &[Turn]) -> ChatSession {
        ChatSession::new(history.iter().map(Content::from).collect())
    }

    /// Send one user message in the context of `session` and wait for
    /// the reply text. Never retries.
    async fn send_message(
        &self,
        session: &ChatSession,
        text: &str,
    ) -> Result<String, ModelInvocationError>;
}

pub type SharedModelClient = Arc<dyn ModelClient>;

/// Client for the Gemini `generateContent` API.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_hostname: String,
    api_key: Secret,
    model: String,
    system_instruction: String,
}

impl GeminiClient {
    /// Build a client from the loaded config. Fails only if the HTTP
    /// client itself can't be set up, which is a startup error rather
    /// than a failed model call.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build the HTTP client")?;

        Ok(Self {
            http,
            api_hostname: config.api_hostname.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            system_instruction: config.system_instruction.clone(),
        })
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn send_message(
        &self,
        session: &ChatSession,
        text: &str,
    ) -> Result<String, ModelInvocationError> {
        let mut contents = session.history().to_vec();
        contents.push(Content::new("user", text));

        tracing::debug!(
            "Sending message to {} with {} prior turns",
            self.model,
            session.history().len()
        );

        let resp = generate_content(
            &self.http,
            &contents,
            &self.system_instruction,
            &self.api_hostname,
            &self.api_key,
            &self.model,
        )
        .await?;

        reply_text(&resp)
    }
}

/// Call `generateContent` and return the raw JSON response.
pub async fn generate_content(
    http: &reqwest::Client,
    contents: &[Content],
    system_instruction: &str,
    api_hostname: &str,
    api_key: &Secret,
    model: &str,
) -> Result<Value, ModelInvocationError> {
    let payload = json!({
        "systemInstruction": {
            "parts": [{"text": system_instruction}]
        },
        "contents": contents,
    });
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        api_hostname.trim_end_matches('/'),
        model
    );
    let response = http
        .post(url)
        .header("x-goog-api-key", api_key.expose())
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        // Errors come back as {"error": {"code": 400, "message": "...", "status": "..."}}
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(body);
        tracing::error!("Model service error {}: {}", status, message);
        return Err(ModelInvocationError::Remote {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| ModelInvocationError::Malformed(format!("Invalid JSON: {}", e)))
}

/// Extract the reply from a `generateContent` response by joining the
/// text parts of the first candidate.
pub fn reply_text(resp: &Value) -> Result<String, ModelInvocationError> {
    let Some(candidate) = resp["candidates"].as_array().and_then(|c| c.first()) else {
        if let Some(reason) = resp["promptFeedback"]["blockReason"].as_str() {
            return Err(ModelInvocationError::Malformed(format!(
                "Prompt was blocked: {}",
                reason
            )));
        }
        return Err(ModelInvocationError::Malformed(format!(
            "No candidates in response: {}",
            resp
        )));
    };

    let texts: Vec<&str> = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    if texts.is_empty() {
        let finish_reason = candidate["finishReason"].as_str().unwrap_or("unknown");
        return Err(ModelInvocationError::Malformed(format!(
            "No text in response (finish reason: {})",
            finish_reason
        )));
    }

    Ok(texts.concat())
}
