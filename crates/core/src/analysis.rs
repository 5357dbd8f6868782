//! Outbound calls to the remote analysis API.
//!
//! The API is an opaque collaborator: one multipart POST carrying the image goes out, one
//! status code and body come back. [`AnalysisClient`] is the seam between the upload flow and
//! the network, and [`classify_response`] turns the raw reply into either findings or a
//! user-facing [`SubmissionError`].

use crate::config::AppConfig;
use crate::constants::{IMAGE_FIELD_NAME, INVALID_REQUEST_FALLBACK, USER_AGENT};
use crate::error::{ConfigResult, SubmissionError, SubmissionResult};
use crate::finding::Finding;
use crate::store::Summary;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client};
use serde_json::{Map, Value};

/// An image selected by the user, ready to be forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Creates an upload from the browser's multipart part.
    ///
    /// When the browser did not declare a content type, one is derived from the filename
    /// extension.
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| content_type_for(&filename).to_string());
        Self {
            filename,
            content_type,
            bytes,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercased filename extension, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

fn content_type_for(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

/// Raw reply from the analysis API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Successful analysis, ready to be stored as a record.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPayload {
    pub summary: Summary,
    pub findings: Vec<Finding>,
}

/// Sends one image to the analysis service.
///
/// Implementations make exactly one attempt. Transport failures (connection errors, timeouts,
/// unreadable bodies) are reported as [`SubmissionError::NetworkOrParse`]; any HTTP status,
/// including errors, is returned as an [`ApiResponse`] for [`classify_response`] to judge.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn send(&self, image: ImageUpload) -> SubmissionResult<ApiResponse>;
}

/// [`AnalysisClient`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpAnalysisClient {
    client: Client,
    url: String,
}

impl HttpAnalysisClient {
    /// Builds a client with the configured endpoint and request timeout.
    pub fn new(cfg: &AppConfig) -> ConfigResult<Self> {
        let client = Client::builder()
            .timeout(cfg.request_timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            url: cfg.api_url().to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn send(&self, image: ImageUpload) -> SubmissionResult<ApiResponse> {
        let ImageUpload {
            filename,
            content_type,
            bytes,
        } = image;

        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str(&content_type)
            .map_err(unexpected)?;
        let form = Form::new().part(IMAGE_FIELD_NAME, part);

        let response = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(unexpected)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(unexpected)?;
        Ok(ApiResponse { status, body })
    }
}

fn unexpected(err: impl std::fmt::Display) -> SubmissionError {
    SubmissionError::NetworkOrParse(err.to_string())
}

/// Classifies a raw API reply.
///
/// - `200`: the body must be a non-empty JSON object; its `results` array becomes the findings
///   and the summary records whether the key was present at all. `{}` and `null` are
///   [`SubmissionError::EmptyResponse`].
/// - `400`: the `details` text of the JSON error object, or a fallback when it has none. A body
///   that is not a JSON object is a parse failure.
/// - `422`: fixed unprocessable-entity error.
/// - anything else: status code and raw body.
pub fn classify_response(response: &ApiResponse) -> SubmissionResult<AnalysisPayload> {
    match response.status {
        200 => parse_success(&response.body),
        400 => Err(SubmissionError::ClientRequest(error_details(&response.body)?)),
        422 => Err(SubmissionError::UnprocessableEntity),
        status => Err(SubmissionError::OtherHttp {
            status,
            body: response.body.clone(),
        }),
    }
}

fn parse_success(body: &str) -> SubmissionResult<AnalysisPayload> {
    let mut object = match serde_json::from_str::<Value>(body).map_err(unexpected)? {
        Value::Null => return Err(SubmissionError::EmptyResponse),
        Value::Object(object) if object.is_empty() => return Err(SubmissionError::EmptyResponse),
        Value::Object(object) => object,
        other => {
            return Err(SubmissionError::NetworkOrParse(format!(
                "expected a JSON object, got {}",
                other
            )))
        }
    };

    match object.remove("results") {
        None => Ok(AnalysisPayload {
            summary: Summary::Error,
            findings: Vec::new(),
        }),
        Some(Value::Null) => Ok(AnalysisPayload {
            summary: Summary::Success,
            findings: Vec::new(),
        }),
        Some(results) => {
            let findings: Vec<Finding> = serde_json::from_value(results).map_err(unexpected)?;
            Ok(AnalysisPayload {
                summary: Summary::Success,
                findings,
            })
        }
    }
}

fn error_details(body: &str) -> SubmissionResult<String> {
    let mut object: Map<String, Value> = serde_json::from_str(body).map_err(unexpected)?;

    Ok(match object.remove("details") {
        Some(Value::String(text)) => text,
        Some(Value::Null) | None => INVALID_REQUEST_FALLBACK.to_string(),
        Some(other) => other.to_string(),
    })
}
