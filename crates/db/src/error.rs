//! Error types for the database client

use serde::Deserialize;
use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

/// Errors raised while building the client or running a table query
#[derive(Debug, Error)]
pub enum DbError {
    #[error("missing {} in environment or .env file", .names.join(" and "))]
    MissingCredentials { names: Vec<&'static str> },

    #[error("invalid service url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header value for {header}")]
    InvalidHeader { header: &'static str },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no rows returned from {table}")]
    EmptyResult { table: String },
}

/// Error body returned by PostgREST on non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl DbError {
    /// Create an API error from a status and the raw response body
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) if parsed.message.is_some() || parsed.code.is_some() => Self::Api {
                status,
                code: parsed.code.unwrap_or_else(|| "unknown".to_string()),
                message: parsed.message.unwrap_or_default(),
                details: parsed.details,
                hint: parsed.hint,
            },
            _ => Self::Api {
                status,
                code: "unknown".to_string(),
                message: if body.trim().is_empty() {
                    "empty response body".to_string()
                } else {
                    body.trim().to_string()
                },
                details: None,
                hint: None,
            },
        }
    }

    /// Create a missing credentials error
    pub fn missing_credentials(names: Vec<&'static str>) -> Self {
        Self::MissingCredentials { names }
    }

    /// Create an invalid url error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error was raised before any request was sent
    #[must_use]
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            DbError::MissingCredentials { .. }
                | DbError::InvalidUrl { .. }
                | DbError::InvalidHeader { .. }
        )
    }
}
