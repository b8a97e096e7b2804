//! Public types for the web UI
use serde::{Deserialize, Serialize};

use crate::ai::chat::Analysis;

#[derive(Deserialize)]
pub struct IndexQuery {
    pub session_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ManualInputForm {
    pub session_id: Option<String>,
    #[serde(default)]
    pub code: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputTab {
    Upload,
    Manual,
}

/// Everything the page template renders.
#[derive(Serialize)]
pub struct PageView {
    pub session_id: String,
    pub language: String,
    pub upload_extension: String,
    pub upload_tab: bool,
    pub file_name: Option<String>,
    pub code: Option<String>,
    pub review: Option<String>,
    pub bug_report: Option<String>,
    pub error: Option<String>,
}

impl PageView {
    pub fn new(session_id: &str, language: &str, upload_extension: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            language: language.to_string(),
            upload_extension: upload_extension.to_string(),
            upload_tab: true,
            file_name: None,
            code: None,
            review: None,
            bug_report: None,
            error: None,
        }
    }

    pub fn tab(mut self, tab: InputTab) -> Self {
        self.upload_tab = tab == InputTab::Upload;
        self
    }

    pub fn with_code(mut self, code: &str, file_name: Option<&str>) -> Self {
        self.code = Some(code.to_string());
        self.file_name = file_name.map(String::from);
        self
    }

    pub fn with_analysis(mut self, analysis: Analysis) -> Self {
        self.review = analysis.review;
        self.bug_report = analysis.bug_report;
        self.error = analysis.error;
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
