//! Public types for the review API
use serde::{Deserialize, Serialize};

use crate::ai::chat::Turn;

#[derive(Deserialize)]
pub struct ReviewRequest {
    // A new session is started when missing
    pub session_id: Option<String>,
    pub code: String,
}

#[derive(Serialize, Deserialize)]
pub struct ReviewResponse {
    pub session_id: String,
    pub review: String,
    pub bug_report: String,
}

/// Returned when a model call fails part way through. `review` is set
/// when only the bug report failed.
#[derive(Serialize, Deserialize)]
pub struct ReviewFailedResponse {
    pub session_id: String,
    pub error: String,
    pub review: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub transcript: Vec<Turn>,
}
