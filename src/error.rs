//! Error types for fetching and extraction

use thiserror::Error;

pub const INVALID_FIELDS_JSON: &str = "Invalid JSON format in fields.";

/// Boxed transport error, so fetchers other than the reqwest one can report causes
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can go wrong below the service boundary
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// A field's selector is neither a string nor a list of strings
    #[error("invalid field configuration for `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// The field configuration payload is not valid JSON
    #[error("invalid field configuration JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// CSS selector could not be compiled
    #[error("invalid CSS selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Transport-level failure (timeout, DNS, connection, non-2xx)
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: BoxError,
    },

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Body contained a CAPTCHA / human-verification marker
    #[error("Blocked by CAPTCHA")]
    Blocked { url: String, marker: String },

    /// HTML could not be turned into a document
    #[error("failed to parse HTML: {0}")]
    Parse(String),
}

impl ScrapeError {
    pub fn fetch(url: &str, source: impl Into<BoxError>) -> Self {
        ScrapeError::Fetch {
            url: url.to_string(),
            source: source.into(),
        }
    }

    pub fn invalid_config(field: &str, reason: impl Into<String>) -> Self {
        ScrapeError::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Message for whoever submitted `url` together with a field payload
    pub fn into_user_message(self, url: &str) -> String {
        match self {
            ScrapeError::InvalidJson(_) => INVALID_FIELDS_JSON.to_string(),
            other => ScrapeFailure::new(url, other).to_string(),
        }
    }

    /// True for failures caused by the caller's field configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ScrapeError::InvalidConfig { .. }
                | ScrapeError::InvalidJson(_)
                | ScrapeError::InvalidSelector { .. }
        )
    }
}

/// The only error that leaves [`crate::ScraperService::extract`]
#[derive(Error, Debug)]
#[error("Scraping failed: {cause}")]
pub struct ScrapeFailure {
    pub url: String,
    #[source]
    pub cause: ScrapeError,
}

impl ScrapeFailure {
    pub fn new(url: &str, cause: ScrapeError) -> Self {
        Self {
            url: url.to_string(),
            cause,
        }
    }

    /// Underlying failure, for callers that branch on the kind
    pub fn kind(&self) -> &ScrapeError {
        &self.cause
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self.cause, ScrapeError::Blocked { .. })
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
