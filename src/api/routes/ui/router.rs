//! Router for the web UI

use std::sync::{Arc, RwLock};

use axum::{
    Form, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};

use super::public::{self, InputTab, PageView};
use super::templates::{INDEX_TEMPLATE, templates};
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::{read_upload, run_analysis, session_id_or_new};

type SharedState = Arc<RwLock<AppState>>;

fn blank_page(state: &SharedState, session_id: &str) -> PageView {
    let shared_state = state.read().expect("Unable to read share state");
    PageView::new(
        session_id,
        &shared_state.config.language,
        &shared_state.config.upload_extension,
    )
}

fn render(status: StatusCode, view: &PageView) -> Result<Response, ApiError> {
    let html = templates().render(INDEX_TEMPLATE, view)?;
    Ok((status, Html(html)).into_response())
}

/// Failed model calls are shown on the page along with whatever
/// result was obtained before the failure.
fn status_for(view: &PageView) -> StatusCode {
    if view.error.is_some() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    }
}

async fn index(
    State(state): State<SharedState>,
    Query(params): Query<public::IndexQuery>,
) -> Result<Response, ApiError> {
    let session_id = session_id_or_new(params.session_id);
    render(StatusCode::OK, &blank_page(&state, &session_id))
}

async fn analyze_manual(
    State(state): State<SharedState>,
    Form(form): Form<public::ManualInputForm>,
) -> Result<Response, ApiError> {
    let session_id = session_id_or_new(form.session_id);
    let view = blank_page(&state, &session_id)
        .tab(InputTab::Manual)
        .with_code(&form.code, None);

    match run_analysis(&state, &session_id, &form.code).await {
        Ok(analysis) => {
            let view = view.with_analysis(analysis);
            render(status_for(&view), &view)
        }
        Err(e) => render(StatusCode::BAD_REQUEST, &view.with_error(&e.to_string())),
    }
}

async fn analyze_upload(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let extension = state
        .read()
        .expect("Unable to read share state")
        .config
        .upload_extension
        .clone();

    let (sent_session_id, upload) = read_upload(multipart, &extension).await;
    let session_id = session_id_or_new(sent_session_id);
    let upload = match upload {
        Ok(upload) => upload,
        Err(e) => {
            let view = blank_page(&state, &session_id).with_error(&e.to_string());
            return render(StatusCode::BAD_REQUEST, &view);
        }
    };

    let view = blank_page(&state, &session_id).with_code(&upload.code, Some(&upload.file_name));

    match run_analysis(&state, &session_id, &upload.code).await {
        Ok(analysis) => {
            let view = view.with_analysis(analysis);
            render(status_for(&view), &view)
        }
        Err(e) => render(StatusCode::BAD_REQUEST, &view.with_error(&e.to_string())),
    }
}

/// Create the web UI router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/analyze/manual", post(analyze_manual))
        .route("/analyze/upload", post(analyze_upload))
}
