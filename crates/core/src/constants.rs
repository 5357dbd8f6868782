//! Constants used throughout the urinalysis core crate.
//!
//! This module contains the outbound API defaults, user-visible messages and upload rules so
//! that the flow, the presenter and the tests agree on the exact text.

/// Default analysis endpoint used when `URINALYSIS_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://api.knoxxi.net/knoxxi-urinanalysis/process";

/// Default address the web server binds to.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Default timeout for the single outbound analysis request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default idle time after which a browser session is discarded, in minutes.
pub const DEFAULT_SESSION_IDLE_MINUTES: u64 = 60;

/// Default maximum accepted upload size, in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 10;

/// `User-Agent` header sent with every analysis request.
pub const USER_AGENT: &str = "KnoxxiUrinalysis/1.0";

/// Multipart field carrying the image, both inbound from the browser and outbound to the API.
pub const IMAGE_FIELD_NAME: &str = "image";

/// File extensions accepted by the upload picker.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Timestamp format used for records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fallback shown for a 400 response without a usable `details` field.
pub const INVALID_REQUEST_FALLBACK: &str = "Invalid request";

/// Notice shown after a record has been added.
pub const RESULTS_ADDED_NOTICE: &str = "Results added successfully!";

