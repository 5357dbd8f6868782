//! # Urinalysis Core
//!
//! Core logic for the urinalysis test platform.
//!
//! This crate contains the session model and the upload flow:
//! - Findings decoded from the analysis API into explicit parameter/value pairs
//! - The session-scoped result store (records plus their findings)
//! - Session state, the modal detail view and the session registry
//! - The analysis client seam, response classification and the upload flow
//!
//! **No HTTP server concerns**: routing, cookies and HTML rendering belong in `urinalysis-web`.

pub mod analysis;
pub mod config;
pub mod constants;
pub mod error;
pub mod finding;
pub mod session;
pub mod store;
pub mod upload;

pub use analysis::{
    classify_response, AnalysisClient, AnalysisPayload, ApiResponse, HttpAnalysisClient,
    ImageUpload,
};
pub use config::{AppConfig, DetailDisplay};
pub use error::{ConfigError, ConfigResult, SubmissionError, SubmissionResult};
pub use finding::Finding;
pub use session::{DetailView, Notice, NoticeKind, SessionHandle, SessionRegistry, SessionState};
pub use store::{Record, RecordId, ResultStore, Summary};
pub use upload::{SubmitOutcome, UploadFlow};
