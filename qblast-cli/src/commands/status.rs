//! Status command implementation

use anyhow::Result;

use qblast_core::{CancelFlag, QblastError, SearchStatus};

use super::http_workflow;
use crate::config::Config;
use crate::error::CliError;

pub fn execute(config: &Config, rid: &str) -> Result<()> {
    let workflow = http_workflow(config.workflow(), CancelFlag::new()).map_err(CliError::from)?;
    let report = workflow.status(rid).map_err(CliError::from)?;

    let hits = match report.has_hits {
        Some(true) => " (hits found)",
        Some(false) => " (no hits)",
        None => "",
    };
    println!("{}: {}{}", rid, report.status, hits);

    match report.status {
        SearchStatus::Failed => {
            Err(CliError::from(QblastError::JobFailed { rid: rid.to_string() }).into())
        }
        SearchStatus::Unknown => {
            Err(CliError::from(QblastError::JobExpired { rid: rid.to_string() }).into())
        }
        SearchStatus::Waiting | SearchStatus::Ready => Ok(()),
    }
}
