//! Router for the review API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use super::public;
use crate::ai::chat::Analysis;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::{read_upload, run_analysis, session_id_or_new};

type SharedState = Arc<RwLock<AppState>>;

fn analysis_response(session_id: String, analysis: Analysis) -> Response {
    match analysis {
        Analysis {
            review: Some(review),
            bug_report: Some(bug_report),
            error: None,
        } => Json(public::ReviewResponse {
            session_id,
            review,
            bug_report,
        })
        .into_response(),
        Analysis { review, error, .. } => (
            StatusCode::BAD_GATEWAY,
            Json(public::ReviewFailedResponse {
                session_id,
                error: error.unwrap_or_else(|| String::from("No response from model")),
                review,
            }),
        )
            .into_response(),
    }
}

/// Review pasted code then ask for a bug report
async fn review_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::ReviewRequest>,
) -> Result<Response, ApiError> {
    let session_id = session_id_or_new(payload.session_id);
    let analysis = run_analysis(&state, &session_id, &payload.code).await?;
    Ok(analysis_response(session_id, analysis))
}

/// Review an uploaded source file then ask for a bug report
async fn upload_handler(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let extension = state
        .read()
        .expect("Unable to read share state")
        .config
        .upload_extension
        .clone();
    let (session_id, upload) = read_upload(multipart, &extension).await;
    let upload = upload?;
    let session_id = session_id_or_new(session_id);
    tracing::debug!("Received upload {}", upload.file_name);

    let analysis = run_analysis(&state, &session_id, &upload.code).await?;
    Ok(analysis_response(session_id, analysis))
}

/// Get the conversation for a session
async fn transcript(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let session = state
        .read()
        .expect("Unable to read share state")
        .find_session(&id);

    let Some(session) = session else {
        return Ok((
            StatusCode::NOT_FOUND,
            format!("Review session {} not found", id),
        )
            .into_response());
    };

    let transcript = session.lock().await.conversation().turns().to_vec();
    Ok(Json(public::TranscriptResponse {
        session_id: id,
        transcript,
    })
    .into_response())
}

/// End a session and discard its conversation
async fn end_session(State(state): State<SharedState>, Path(id): Path<String>) -> StatusCode {
    if state
        .write()
        .expect("Unable to write share state")
        .end_session(&id)
    {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Create the review router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(review_handler))
        .route("/upload", post(upload_handler))
        .route("/{id}", get(transcript).delete(end_session))
}
