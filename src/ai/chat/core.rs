use serde::Serialize;

use super::models::Conversation;
use crate::ai::prompt::bug_report_prompt;
use crate::gemini::{ModelInvocationError, SharedModelClient};

/// Drives a code review conversation with an LLM for a single user
/// session.
///
/// Each call recreates the remote session from the full history and
/// only commits the user message and the reply once the reply has
/// been received. A failed call leaves the conversation untouched.
pub struct Reviewer {
    client: SharedModelClient,
    conversation: Conversation,
    language: String,
}

/// Result of the analyze action. The bug report is requested after
/// the review so a failure can still leave a review behind.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct Analysis {
    pub review: Option<String>,
    pub bug_report: Option<String>,
    pub error: Option<String>,
}

impl Analysis {
    pub fn is_complete(&self) -> bool {
        self.review.is_some() && self.bug_report.is_some() && self.error.is_none()
    }
}

impl Reviewer {
    pub fn new(client: SharedModelClient, language: &str) -> Self {
        Self {
            client,
            conversation: Conversation::new(),
            language: language.to_string(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Send `code` as-is and return the model's reply.
    pub async fn review(&mut self, code: &str) -> Result<String, ModelInvocationError> {
        let session = self.client.create_session(self.conversation.turns());
        let reply = self.client.send_message(&session, code).await?;

        self.conversation.push_exchange(code, &reply);
        tracing::debug!("Conversation now has {} turns", self.conversation.len());

        Ok(reply)
    }

    /// Ask for a bug report and improvement suggestions for `code` as a
    /// new top level message.
    pub async fn review_with_bug_report(
        &mut self,
        code: &str,
    ) -> Result<String, ModelInvocationError> {
        let prompt = bug_report_prompt(&self.language, code);
        self.review(&prompt).await
    }

    /// Review `code` then request a bug report for it. The bug report is
    /// skipped when the review fails.
    pub async fn analyze(&mut self, code: &str) -> Analysis {
        let mut analysis = Analysis::default();

        match self.review(code).await {
            Ok(review) => analysis.review = Some(review),
            Err(e) => {
                tracing::error!("Review failed: {}", e);
                analysis.error = Some(e.to_string());
                return analysis;
            }
        }

        match self.review_with_bug_report(code).await {
            Ok(report) => analysis.bug_report = Some(report),
            Err(e) => {
                tracing::error!("Bug report failed: {}", e);
                analysis.error = Some(e.to_string());
            }
        }

        analysis
    }
}
