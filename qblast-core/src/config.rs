//! Workflow configuration
//!
//! Everything the workflow needs to know about the remote service is passed in
//! through [`WorkflowConfig`] at construction time. All fields carry serde
//! defaults so partial TOML files deserialize cleanly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::xml::IncompleteHitPolicy;

pub const DEFAULT_BASE_URL: &str = "https://blast.ncbi.nlm.nih.gov/Blast.cgi";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Endpoint of the BLAST URL API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// BLAST program (blastn, megablast, ...)
    #[serde(default = "default_program")]
    pub program: String,

    /// Target database
    #[serde(default = "default_database")]
    pub database: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Tool name sent with every request
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Contact address sent with every request
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds to sleep between status checks
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Give up after this many status checks
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Give up once this many seconds have been spent sleeping
    #[serde(default)]
    pub max_wait_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `blast_results.<format>`
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Lines of the text result shown as a preview
    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,

    /// Keep only the first N structured records
    #[serde(default)]
    pub max_hits: Option<usize>,

    /// What to do with hits that have no alignment block
    #[serde(default)]
    pub incomplete_hits: IncompleteHitPolicy,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_program() -> String { "blastn".to_string() }
fn default_database() -> String { "nt".to_string() }
fn default_request_timeout() -> u64 { 60 }
fn default_tool() -> String { "qblast".to_string() }
fn default_interval() -> u64 { 10 }
fn default_max_attempts() -> u32 { 60 }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }
fn default_preview_lines() -> usize { 20 }

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            program: default_program(),
            database: default_database(),
            request_timeout_secs: default_request_timeout(),
            tool: default_tool(),
            email: None,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            max_attempts: default_max_attempts(),
            max_wait_secs: None,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_secs.map(Duration::from_secs)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            preview_lines: default_preview_lines(),
            max_hits: None,
            incomplete_hits: IncompleteHitPolicy::default(),
        }
    }
}
