//! Run configuration
//!
//! Everything a run needs is read from environment variables, optionally
//! seeded from a `.env` file. Parsing goes through a lookup function so it
//! can be exercised without touching the process environment.

use crate::auth::{Credentials, DEFAULT_AUTH_PATH};
use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use crate::output::DEFAULT_OUTPUT_PATH;
use crate::pagination::{DEFAULT_COLLECTION_PATH, DEFAULT_MEMBER_KEY};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

// ============================================================================
// Variable names
// ============================================================================

/// Service root URL
pub const ENV_BASE_URL: &str = "BASE_URL";
/// Login name
pub const ENV_USERNAME: &str = "USERNAME";
/// Login password
pub const ENV_PASSWORD: &str = "PSSWD";
/// Identity sent as `X-Switch-User`
pub const ENV_SWITCH_USER: &str = "SPECIAL_SWITCH_ADMIN";
/// Spreadsheet destination
pub const ENV_OUTPUT_PATH: &str = "OUTPUT_PATH";
/// Comma-separated columns kept as literal text
pub const ENV_TEXT_COLUMNS: &str = "TEXT_COLUMNS";
/// Pause between pages, in milliseconds
pub const ENV_PAGE_DELAY_MS: &str = "PAGE_DELAY_MS";
/// Per-request timeout, in seconds
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

/// Column kept as text when `TEXT_COLUMNS` is unset
pub const DEFAULT_TEXT_COLUMN: &str = "email";

const DEFAULT_PAGE_DELAY_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// AppConfig
// ============================================================================

/// Settings for one export run
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Service root, without trailing slash
    pub base_url: String,
    /// Login credentials and impersonation identity
    pub credentials: Credentials,
    /// Spreadsheet destination
    pub output_path: PathBuf,
    /// Columns kept as literal text
    pub text_columns: Vec<String>,
    /// Pause after each non-empty page
    pub page_delay: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Login endpoint, relative to `base_url`
    pub auth_path: String,
    /// Collection endpoint, relative to `base_url`
    pub collection_path: String,
    /// Key holding the records of a page
    pub member_key: String,
}

impl AppConfig {
    /// Create a config with defaults for everything but the connection
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            text_columns: vec![DEFAULT_TEXT_COLUMN.to_string()],
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            collection_path: DEFAULT_COLLECTION_PATH.to_string(),
            member_key: DEFAULT_MEMBER_KEY.to_string(),
        }
    }

    /// Load `.env` from the working directory if present, then read the
    /// process environment
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(Error::config(format!("Failed to read .env file: {e}"))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load variables from `path` into the process environment, then read it
    ///
    /// Variables already set in the environment win over the file.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        dotenvy::from_path(path).map_err(|e| {
            Error::config(format!("Failed to read env file {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "Loaded env file");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = required(&lookup, ENV_BASE_URL)?;
        Url::parse(&base_url)?;

        let credentials = Credentials::new(
            required(&lookup, ENV_USERNAME)?,
            required(&lookup, ENV_PASSWORD)?,
            required(&lookup, ENV_SWITCH_USER)?,
        );

        let mut config = Self::new(base_url, credentials);

        if let Some(path) = optional(&lookup, ENV_OUTPUT_PATH) {
            config.output_path = PathBuf::from(path);
        }
        if let Some(columns) = lookup(ENV_TEXT_COLUMNS) {
            config.text_columns = parse_list(&columns);
        }
        if let Some(ms) = parse_number(&lookup, ENV_PAGE_DELAY_MS)? {
            config.page_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_number(&lookup, ENV_REQUEST_TIMEOUT_SECS)? {
            if secs == 0 {
                return Err(Error::invalid_value(
                    ENV_REQUEST_TIMEOUT_SECS,
                    "must be greater than zero",
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Override the output path
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Override the page delay
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// HTTP client settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(self.base_url.as_str())
            .timeout(self.request_timeout)
            .build()
    }
}

/// A variable that must be present and non-blank
fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| Error::missing_field(key))
}

/// A variable that counts as unset when blank
fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key)
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|e| Error::invalid_value(key, format!("'{raw}': {e}")))
        })
        .transpose()
}

/// Split a comma list, dropping blanks
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
