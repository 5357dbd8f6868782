//! # Urinalysis Web
//!
//! HTTP front end for the urinalysis test platform.
//!
//! Serves the upload page, forwards submissions to the upload flow and re-renders the whole
//! page from the caller's session after every interaction (post/redirect/get). A small JSON
//! surface (`/health`, `/api/session/records`) is documented with OpenAPI.

pub mod cookie;
pub mod presenter;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use urinalysis_core::{
    constants::IMAGE_FIELD_NAME, AnalysisClient, AppConfig, ImageUpload, RecordId, SessionHandle,
    SessionRegistry, SubmitOutcome, UploadFlow,
};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

pub use presenter::Presenter;

/// Errors raised while assembling the web application.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("failed to load page template: {0}")]
    Template(#[from] minijinja::Error),
}

/// Application state shared across handlers
///
/// Holds the session registry, the upload flow bound to the analysis client, and the presenter
/// for the configured detail strategy.
#[derive(Clone)]
pub struct AppState {
    sessions: SessionRegistry,
    flow: UploadFlow,
    presenter: Arc<Presenter>,
}

impl AppState {
    /// Builds the state from resolved configuration and an analysis client.
    pub fn new(cfg: &AppConfig, client: Arc<dyn AnalysisClient>) -> Result<Self, WebError> {
        Ok(Self {
            sessions: SessionRegistry::new(cfg.session_idle_timeout()),
            flow: UploadFlow::new(client),
            presenter: Arc::new(Presenter::new(cfg.detail_display())?),
        })
    }
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// One finding as exposed by the JSON API
#[derive(Debug, Serialize, ToSchema)]
pub struct FindingRes {
    pub parameter: String,
    pub value: String,
    pub interpretation: String,
    pub clinical_significance: String,
    pub follow_up: String,
}

/// One record with its findings
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordRes {
    pub id: u32,
    pub timestamp: String,
    pub summary: String,
    pub findings: Vec<FindingRes>,
}

/// Snapshot of the caller's result store
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionRecordsRes {
    pub detail_display: String,
    pub records: Vec<RecordRes>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, session_records),
    components(schemas(HealthRes, FindingRes, RecordRes, SessionRecordsRes))
)]
pub struct ApiDoc;

/// Builds the application router.
///
/// Request bodies larger than the configured upload limit are rejected before they reach the
/// upload flow.
pub fn router(state: AppState, cfg: &AppConfig) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/submit", post(submit))
        .route("/records/:id/view", post(open_detail))
        .route("/detail/close", post(close_detail))
        .route("/session/end", post(end_session))
        .route("/health", get(health))
        .route("/api/session/records", get(session_records))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolves the caller's session, starting one when the cookie is missing or stale.
async fn session_for(state: &AppState, headers: &HeaderMap) -> (Uuid, SessionHandle, bool) {
    state.sessions.resolve(cookie::session_id(headers)).await
}

/// Attaches the session cookie to `response` when the session was just created.
fn with_session(response: impl IntoResponse, id: Uuid, created: bool) -> Response {
    let mut response = response.into_response();
    if created {
        cookie::set_session(response.headers_mut(), id);
    }
    response
}

/// Render the page for the caller's session
///
/// Consumes any pending notice, so a message is shown exactly once.
#[axum::debug_handler]
async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, session, created) = session_for(&state, &headers).await;

    let mut session = session.lock().await;
    let notice = session.take_notice();
    match state.presenter.render(&session, notice.as_ref()) {
        Ok(html) => with_session(Html(html), id, created),
        Err(e) => {
            tracing::error!("Render page error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

/// Accept an image upload and run it through the upload flow
///
/// Always redirects back to the page; the outcome is carried by the session notice.
#[axum::debug_handler]
async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let (id, session, created) = session_for(&state, &headers).await;

    let image = match read_image(multipart).await {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!("Rejected upload: {}", e.body_text());
            return with_session((e.status(), e.body_text()), id, created);
        }
    };

    match state.flow.submit(&session, image).await {
        SubmitOutcome::Added(record_id) => tracing::debug!("session {} added {}", id, record_id),
        SubmitOutcome::NoImage => tracing::debug!("session {} submitted nothing", id),
        SubmitOutcome::Failed(_) => {}
    }

    with_session(Redirect::to("/"), id, created)
}

/// Reads the `image` part of the upload form.
///
/// Returns `None` when the part is missing or carries no filename, which is how browsers send
/// an empty file input.
async fn read_image(
    mut multipart: Multipart,
) -> Result<Option<ImageUpload>, axum::extract::multipart::MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD_NAME) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        if filename.is_empty() {
            return Ok(None);
        }
        return Ok(Some(ImageUpload::new(filename, content_type, bytes.to_vec())));
    }
    Ok(None)
}

/// Open the detail dialog for one record
#[axum::debug_handler]
async fn open_detail(
    State(state): State<AppState>,
    Path(record_id): Path<RecordId>,
    headers: HeaderMap,
) -> Response {
    let (id, session, created) = session_for(&state, &headers).await;
    if !session.lock().await.open_detail(record_id) {
        tracing::debug!("session {} has no record {}", id, record_id);
    }
    with_session(Redirect::to("/"), id, created)
}

/// Close the detail dialog
#[axum::debug_handler]
async fn close_detail(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, session, created) = session_for(&state, &headers).await;
    session.lock().await.close_detail();
    with_session(Redirect::to("/"), id, created)
}

/// Discard the caller's session and its results
#[axum::debug_handler]
async fn end_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = cookie::session_id(&headers) {
        state.sessions.end(id).await;
    }
    let mut response = Redirect::to("/").into_response();
    cookie::clear_session(response.headers_mut());
    response
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Returns the current health status of the web front end.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Urinalysis web is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/api/session/records",
    responses(
        (status = 200, description = "Records and findings of the caller's session", body = SessionRecordsRes)
    )
)]
/// Snapshot of the caller's result store
///
/// Read-only: neither the store nor the pending notice is touched.
#[axum::debug_handler]
async fn session_records(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, session, created) = session_for(&state, &headers).await;
    let session = session.lock().await;
    let store = session.store();

    let records = store
        .records()
        .iter()
        .map(|record| RecordRes {
            id: record.id(),
            timestamp: record.timestamp_text(),
            summary: record.summary().to_string(),
            findings: store
                .findings(record.id())
                .unwrap_or_default()
                .iter()
                .map(|f| FindingRes {
                    parameter: f.parameter.clone(),
                    value: f.value_text(),
                    interpretation: f.interpretation.clone(),
                    clinical_significance: f.clinical_significance.clone(),
                    follow_up: f.follow_up.clone(),
                })
                .collect(),
        })
        .collect();

    let body = SessionRecordsRes {
        detail_display: state.presenter.display().to_string(),
        records,
    };
    with_session(Json(body), id, created)
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
