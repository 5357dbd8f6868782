//! Upload-and-analyse flow.
//!
//! Takes the image a user submitted, forwards it to the analysis API once, and records the
//! outcome on the session: a new record on success, an error notice otherwise. The session lock
//! is only taken after the API has replied, and id assignment happens under that lock, so
//! concurrent submissions from one browser still get distinct, increasing ids.

use crate::analysis::{classify_response, AnalysisClient, AnalysisPayload, ImageUpload};
use crate::constants::{ALLOWED_IMAGE_EXTENSIONS, RESULTS_ADDED_NOTICE};
use crate::error::{SubmissionError, SubmissionResult};
use crate::session::{Notice, SessionHandle};
use crate::store::RecordId;
use std::sync::Arc;

/// What a submission did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was selected; no request was sent and nothing changed.
    NoImage,
    /// A record was added under this id.
    Added(RecordId),
    /// The submission failed; the error is also left on the session as a notice.
    Failed(SubmissionError),
}

/// Runs submissions against one analysis client.
#[derive(Clone)]
pub struct UploadFlow {
    client: Arc<dyn AnalysisClient>,
}

impl UploadFlow {
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        Self { client }
    }

    /// Submits `image` on behalf of `session`.
    ///
    /// No image, or one without a filename, is a silent no-op. Any selected file is sent, even
    /// an empty one. Every other path replaces the session's notice and closes any open detail
    /// dialog.
    pub async fn submit(&self, session: &SessionHandle, image: Option<ImageUpload>) -> SubmitOutcome {
        let Some(image) = image.filter(|i| !i.filename().is_empty()) else {
            tracing::debug!("submit without image ignored");
            return SubmitOutcome::NoImage;
        };

        let filename = image.filename().to_string();
        let result = match check_extension(&image) {
            Ok(()) => self.analyse(image).await,
            Err(e) => Err(e),
        };

        let mut state = session.lock().await;
        state.close_detail();
        match result {
            Ok(payload) => {
                let findings = payload.findings.len();
                let now = chrono::Local::now().naive_local();
                let id = state
                    .store_mut()
                    .append(now, payload.summary, payload.findings)
                    .id();
                state.set_notice(Notice::success(RESULTS_ADDED_NOTICE));
                tracing::info!(
                    "added record {} for {} ({} findings)",
                    id,
                    filename,
                    findings
                );
                SubmitOutcome::Added(id)
            }
            Err(e) => {
                tracing::warn!("submission of {} failed: {}", filename, e);
                state.set_notice(Notice::error(e.to_string()));
                SubmitOutcome::Failed(e)
            }
        }
    }

    async fn analyse(&self, image: ImageUpload) -> SubmissionResult<AnalysisPayload> {
        let response = self.client.send(image).await?;
        tracing::debug!("analysis API replied with status {}", response.status);
        classify_response(&response)
    }
}

fn check_extension(image: &ImageUpload) -> SubmissionResult<()> {
    match image.extension() {
        Some(ext) if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(SubmissionError::UnsupportedFileType(
            image.filename().to_string(),
        )),
    }
}
