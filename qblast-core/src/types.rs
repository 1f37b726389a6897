use serde::{Deserialize, Serialize};
use std::fmt;

/// Result encodings requested from the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Xml,
}

impl OutputFormat {
    /// Value sent as `FORMAT_TYPE`
    pub fn format_type(&self) -> &'static str {
        match self {
            OutputFormat::Text => "Text",
            OutputFormat::Xml => "XML",
        }
    }

    /// Name of the file holding the full result body
    pub fn output_file_name(&self) -> String {
        format!("blast_results.{}", self.format_type().to_lowercase())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_type())
    }
}

/// A submitted search. Immutable once the service has issued its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub rid: String,
    pub program: String,
    pub database: String,
    pub query: String,
    pub format: OutputFormat,
    /// Service estimate of seconds until completion (`RTOE`)
    pub estimated_seconds: Option<u64>,
}

/// Lifecycle of a single job within one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Submitted,
    Polling,
    Ready,
    Fetched,
    Formatted,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Formatted | JobState::Failed)
    }

    /// Legal moves of the workflow state machine
    pub fn can_advance_to(&self, next: JobState) -> bool {
        use JobState::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Created, Submitted)
            | (Submitted, Polling)
            | (Polling, Polling)
            | (Polling, Ready)
            | (Ready, Fetched)
            | (Fetched, Formatted) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Created => "created",
            JobState::Submitted => "submitted",
            JobState::Polling => "polling",
            JobState::Ready => "ready",
            JobState::Fetched => "fetched",
            JobState::Formatted => "formatted",
            JobState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Search status reported by a `FORMAT_OBJECT=SearchInfo` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Waiting,
    Ready,
    Failed,
    Unknown,
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchStatus::Waiting => "WAITING",
            SearchStatus::Ready => "READY",
            SearchStatus::Failed => "FAILED",
            SearchStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// Parsed answer to a single status check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub status: SearchStatus,
    /// `ThereAreHits=yes|no`, only present once the search is ready
    pub has_hits: Option<bool>,
}

/// Fields extracted from the top HSP of one hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub target_id: String,
    pub target_description: String,
    pub identity: u32,
    pub align_len: u32,
    pub evalue: f64,
    pub query_seq: String,
    pub target_seq: String,
}

impl MatchRecord {
    /// Identity as a percentage of the alignment length
    pub fn percent_identity(&self) -> f64 {
        if self.align_len == 0 {
            0.0
        } else {
            self.identity as f64 / self.align_len as f64 * 100.0
        }
    }

    /// `identity/align_len`, the way BLAST reports it
    pub fn identity_label(&self) -> String {
        format!("{}/{}", self.identity, self.align_len)
    }
}
