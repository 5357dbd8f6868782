/// Failures that can end a submission before a record is created.
///
/// Every variant is surfaced to the user as an inline notice; none of them are fatal to the
/// session and none are retried. The `Display` text is exactly what the page shows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Unsupported file type: {0}. Please choose a jpg, jpeg or png image.")]
    UnsupportedFileType(String),
    #[error("Error 400: {0}")]
    ClientRequest(String),
    #[error("Error 422: Unprocessable Entity. Please check the file format.")]
    UnprocessableEntity,
    #[error("API Error: {status} - {body}")]
    OtherHttp { status: u16, body: String },
    #[error("An unexpected error occurred: {0}")]
    NetworkOrParse(String),
    /// The API answered `200` with an empty document.
    #[error("Failed to process the image.")]
    EmptyResponse,
}

pub type SubmissionResult<T> = std::result::Result<T, SubmissionError>;

/// Failures while resolving configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("failed to build analysis client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
