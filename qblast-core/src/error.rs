//! Error types for qblast-core

use thiserror::Error;

/// Result type for workflow operations
pub type QblastResult<T> = Result<T, QblastError>;

/// Errors that can occur while talking to the remote BLAST service
#[derive(Debug, Error)]
pub enum QblastError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Submission rejected: {message}")]
    Submission { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Job {rid} failed on the remote service")]
    JobFailed { rid: String },

    #[error("Job {rid} is unknown to the remote service (expired or never submitted)")]
    JobExpired { rid: String },

    #[error("Job {rid} not ready after {attempts} status checks")]
    PollTimeout { rid: String, attempts: u32 },

    #[error("Job {rid} cancelled while waiting for results")]
    Cancelled { rid: String },

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QblastError {
    pub fn submission<S: Into<String>>(message: S) -> Self {
        Self::Submission { message: message.into() }
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse { message: message.into() }
    }

    /// True when retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::PollTimeout { .. })
    }
}

impl From<reqwest::Error> for QblastError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.to_string())
    }
}

impl From<quick_xml::Error> for QblastError {
    fn from(err: quick_xml::Error) -> Self {
        Self::parse(format!("malformed XML: {}", err))
    }
}

/// Shorten a response body for inclusion in an error message
pub(crate) fn excerpt(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    let mut out: String = trimmed.chars().take(max_chars).collect();
    if trimmed.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}
