//! qblast core library
//!
//! Client for the NCBI BLAST URL API: submit a query, wait for the remote job,
//! fetch the result and turn it into a preview or a list of match records.

pub mod config;
pub mod error;
pub mod fetch;
pub mod poll;
pub mod report;
pub mod submit;
pub mod transport;
pub mod types;
pub mod workflow;
pub mod xml;

// Re-export commonly used types and functions
pub use config::{OutputConfig, PollConfig, ServiceConfig, WorkflowConfig};
pub use error::{QblastError, QblastResult};
pub use poll::{CancelFlag, CancellableSleeper, PollOutcome, Sleeper};
pub use report::{MatchReport, Report, TextReport};
pub use transport::{Command, HttpTransport, ServiceRequest, Transport};
pub use types::{Job, JobState, MatchRecord, OutputFormat, SearchStatus, StatusReport};
pub use workflow::{LogObserver, ProgressObserver, Workflow, WorkflowEvent};
pub use xml::{IncompleteHitPolicy, ParseOptions};

/// Version information for the qblast core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
