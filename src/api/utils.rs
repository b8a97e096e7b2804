use std::path::Path;
use std::sync::{Arc, RwLock};

use axum::body::Bytes;
use axum::extract::Multipart;
use uuid::Uuid;

use crate::ai::chat::Analysis;
use crate::api::public::SubmissionError;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// A source file submitted through a multipart form.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub code: String,
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Use the client's session ID if it sent a usable one, otherwise
/// start a new session.
pub fn session_id_or_new(session_id: Option<String>) -> String {
    session_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(new_session_id)
}

/// Read the `session_id` and `file` fields from a multipart upload.
/// Only files with the configured extension that decode as UTF-8 are
/// accepted. The session ID is returned even when the file is
/// rejected so the caller can stay in the same session.
pub async fn read_upload(
    mut multipart: Multipart,
    extension: &str,
) -> (Option<String>, Result<Upload, SubmissionError>) {
    let mut session_id = None;
    let upload = read_fields(&mut multipart, &mut session_id)
        .await
        .and_then(|file| validate_upload(file, extension));
    (session_id, upload)
}

async fn read_fields(
    multipart: &mut Multipart,
    session_id: &mut Option<String>,
) -> Result<Option<(String, Bytes)>, SubmissionError> {
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SubmissionError::Multipart(e.to_string()))?
    {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("session_id") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| SubmissionError::Multipart(e.to_string()))?;
                *session_id = Some(value);
            }
            Some("file") => {
                let file_name = field.file_name().map(String::from).unwrap_or_default();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| SubmissionError::Multipart(e.to_string()))?;
                file = Some((file_name, bytes));
            }
            _ => {}
        }
    }

    Ok(file)
}

fn validate_upload(
    file: Option<(String, Bytes)>,
    extension: &str,
) -> Result<Upload, SubmissionError> {
    // Browsers send an empty part when no file was picked
    let (file_name, bytes) = file
        .filter(|(name, _)| !name.is_empty())
        .ok_or(SubmissionError::MissingFile)?;

    if !has_extension(&file_name, extension) {
        return Err(SubmissionError::UnsupportedFileType {
            file_name,
            expected: extension.to_string(),
        });
    }

    let code = String::from_utf8(bytes.to_vec()).map_err(|_| SubmissionError::InvalidEncoding)?;

    Ok(Upload { file_name, code })
}

fn has_extension(file_name: &str, extension: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Run the analyze action for `code` in the given session. The
/// session is held for both model calls so they run back to back.
pub async fn run_analysis(
    state: &SharedState,
    session_id: &str,
    code: &str,
) -> Result<Analysis, SubmissionError> {
    if code.trim().is_empty() {
        return Err(SubmissionError::EmptyCode);
    }

    let session = state
        .write()
        .expect("Unable to write shared state")
        .get_or_create_session(session_id);

    let mut reviewer = session.lock().await;
    tracing::info!("Analyzing {} bytes of code for session {}", code.len(), session_id);
    Ok(reviewer.analyze(code).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        assert!(has_extension("script.py", "py"));
        assert!(has_extension("SCRIPT.PY", "py"));
        assert!(!has_extension("script.rs", "py"));
        assert!(!has_extension("py", "py"));
        assert!(!has_extension("script.py.txt", "py"));
    }

    #[test]
    fn test_validate_upload() {
        let upload = validate_upload(
            Some((String::from("hello.py"), Bytes::from_static(b"print(1)"))),
            "py",
        )
        .unwrap();
        assert_eq!(upload.file_name, "hello.py");
        assert_eq!(upload.code, "print(1)");

        assert!(matches!(
            validate_upload(None, "py"),
            Err(SubmissionError::MissingFile)
        ));
        assert!(matches!(
            validate_upload(Some((String::new(), Bytes::new())), "py"),
            Err(SubmissionError::MissingFile)
        ));
        assert!(matches!(
            validate_upload(Some((String::from("script.rs"), Bytes::new())), "py"),
            Err(SubmissionError::UnsupportedFileType { .. })
        ));
        assert!(matches!(
            validate_upload(
                Some((String::from("bad.py"), Bytes::from_static(&[0xff, 0xfe]))),
                "py"
            ),
            Err(SubmissionError::InvalidEncoding)
        ));
    }

    #[test]
    fn test_session_id_or_new() {
        assert_eq!(session_id_or_new(Some(String::from("abc"))), "abc");

        let generated = session_id_or_new(Some(String::from("  ")));
        assert!(Uuid::parse_str(&generated).is_ok());

        let generated = session_id_or_new(None);
        assert!(Uuid::parse_str(&generated).is_ok());
    }
}
