//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the services. Request handling never reads process-wide environment variables;
//! the `*_from_env_value` helpers take the raw value so they can be tested without touching the
//! environment.

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_BIND_ADDR, DEFAULT_MAX_UPLOAD_MB, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SESSION_IDLE_MINUTES,
};
use crate::{ConfigError, ConfigResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a record's findings are shown on the page.
///
/// Chosen once per process; a session never switches between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailDisplay {
    /// One collapsible section per record below the summary table.
    #[default]
    Inline,
    /// A "View Result" action per row opening an overlay dialog.
    Modal,
}

impl FromStr for DetailDisplay {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "modal" => Ok(Self::Modal),
            _ => Err(ConfigError::InvalidValue {
                name: "URINALYSIS_DETAIL_DISPLAY",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DetailDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("inline"),
            Self::Modal => f.write_str("modal"),
        }
    }
}

/// Application configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    bind_addr: String,
    api_url: String,
    request_timeout: Duration,
    detail_display: DetailDisplay,
    session_idle_timeout: Duration,
    max_upload_bytes: usize,
}

impl AppConfig {
    /// Create a new `AppConfig`.
    pub fn new(
        bind_addr: String,
        api_url: String,
        request_timeout: Duration,
        detail_display: DetailDisplay,
        session_idle_timeout: Duration,
        max_upload_bytes: usize,
    ) -> ConfigResult<Self> {
        if bind_addr.trim().is_empty() {
            return Err(ConfigError::InvalidInput("bind_addr cannot be empty".into()));
        }
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: "URINALYSIS_API_URL",
                value: api_url,
            });
        }
        if request_timeout.is_zero() || session_idle_timeout.is_zero() || max_upload_bytes == 0 {
            return Err(ConfigError::InvalidInput(
                "timeouts and upload limit must be greater than zero".into(),
            ));
        }

        Ok(Self {
            bind_addr,
            api_url,
            request_timeout,
            detail_display,
            session_idle_timeout,
            max_upload_bytes,
        })
    }

    /// Resolve configuration from raw environment values.
    ///
    /// Each argument is the value of the matching `URINALYSIS_*` variable, or `None` when it is
    /// unset. Empty or whitespace-only values count as unset.
    pub fn from_env_values(
        bind_addr: Option<String>,
        api_url: Option<String>,
        request_timeout_secs: Option<String>,
        detail_display: Option<String>,
        session_idle_minutes: Option<String>,
        max_upload_mb: Option<String>,
    ) -> ConfigResult<Self> {
        let request_timeout_secs = positive_from_env_value(
            "URINALYSIS_REQUEST_TIMEOUT_SECS",
            request_timeout_secs,
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let session_idle_minutes = positive_from_env_value(
            "URINALYSIS_SESSION_IDLE_MINUTES",
            session_idle_minutes,
            DEFAULT_SESSION_IDLE_MINUTES,
        )?;
        let max_upload_mb = positive_from_env_value(
            "URINALYSIS_MAX_UPLOAD_MB",
            max_upload_mb,
            DEFAULT_MAX_UPLOAD_MB,
        )?;

        let session_idle_secs =
            session_idle_minutes
                .checked_mul(60)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: "URINALYSIS_SESSION_IDLE_MINUTES",
                    value: session_idle_minutes.to_string(),
                })?;
        let max_upload_bytes =
            max_upload_mb
                .checked_mul(1024 * 1024)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: "URINALYSIS_MAX_UPLOAD_MB",
                    value: max_upload_mb.to_string(),
                })?;

        Self::new(
            non_empty(bind_addr).unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            non_empty(api_url).unwrap_or_else(|| DEFAULT_API_URL.into()),
            Duration::from_secs(request_timeout_secs),
            detail_display_from_env_value(detail_display)?,
            Duration::from_secs(session_idle_secs),
            max_upload_bytes,
        )
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn detail_display(&self) -> DetailDisplay {
        self.detail_display
    }

    pub fn session_idle_timeout(&self) -> Duration {
        self.session_idle_timeout
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            api_url: DEFAULT_API_URL.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            detail_display: DetailDisplay::default(),
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_MINUTES * 60),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

/// Parse the detail display strategy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DetailDisplay::Inline`].
pub fn detail_display_from_env_value(value: Option<String>) -> ConfigResult<DetailDisplay> {
    non_empty(value)
        .map(|v| v.parse::<DetailDisplay>())
        .transpose()
        .map(Option::unwrap_or_default)
}

fn positive_from_env_value<T>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> ConfigResult<T>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = non_empty(value) else {
        return Ok(default);
    };
    match raw.parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(ConfigError::InvalidValue { name, value: raw }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = AppConfig::from_env_values(None, None, None, None, None, None).unwrap();
        assert_eq!(cfg.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.api_url(), DEFAULT_API_URL);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.detail_display(), DetailDisplay::Inline);
        assert_eq!(cfg.session_idle_timeout(), Duration::from_secs(3600));
        assert_eq!(cfg.max_upload_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = AppConfig::from_env_values(
            Some("  ".into()),
            Some("".into()),
            Some(" ".into()),
            Some("".into()),
            None,
            None,
        )
        .unwrap();
        assert_eq!(cfg.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn detail_display_parses_case_insensitively() {
        assert_eq!(
            detail_display_from_env_value(Some("Modal".into())).unwrap(),
            DetailDisplay::Modal
        );
        assert_eq!(
            detail_display_from_env_value(Some(" inline ".into())).unwrap(),
            DetailDisplay::Inline
        );
        assert_eq!(detail_display_from_env_value(None).unwrap(), DetailDisplay::Inline);
    }

    #[test]
    fn unknown_detail_display_is_rejected() {
        let err = detail_display_from_env_value(Some("popup".into())).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "URINALYSIS_DETAIL_DISPLAY",
                ..
            }
        ));
    }

    #[test]
    fn zero_or_garbage_timeouts_are_rejected() {
        let err = AppConfig::from_env_values(None, None, Some("0".into()), None, None, None)
            .unwrap_err();
        assert!(err.to_string().contains("URINALYSIS_REQUEST_TIMEOUT_SECS"));

        let err = AppConfig::from_env_values(None, None, None, None, Some("soon".into()), None)
            .unwrap_err();
        assert!(err.to_string().contains("URINALYSIS_SESSION_IDLE_MINUTES"));
    }

    #[test]
    fn values_that_overflow_their_unit_are_rejected() {
        let huge = u64::MAX.to_string();
        let err = AppConfig::from_env_values(None, None, None, None, Some(huge.clone()), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "URINALYSIS_SESSION_IDLE_MINUTES",
                ..
            }
        ));

        let err = AppConfig::from_env_values(None, None, None, None, None, Some(huge)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "URINALYSIS_MAX_UPLOAD_MB",
                ..
            }
        ));
    }

    #[test]
    fn non_http_api_url_is_rejected() {
        let err = AppConfig::from_env_values(None, Some("ftp://x".into()), None, None, None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "URINALYSIS_API_URL",
                ..
            }
        ));
    }
}
