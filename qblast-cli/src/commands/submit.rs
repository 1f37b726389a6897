//! Submit command implementation - queue a search without waiting

use anyhow::Result;

use qblast_core::{CancelFlag, OutputFormat};

use super::{http_workflow, read_query, QueryArgs, ServiceArgs};
use crate::config::Config;
use crate::error::CliError;

pub fn execute(
    config: &Config,
    query: QueryArgs,
    format: OutputFormat,
    service: ServiceArgs,
) -> Result<()> {
    let query = read_query(&query)?;

    let mut workflow_config = config.workflow();
    service.apply(&mut workflow_config.service);

    let workflow = http_workflow(workflow_config, CancelFlag::new()).map_err(CliError::from)?;
    let job = workflow.submit(&query, format).map_err(CliError::from)?;

    if let Some(secs) = job.estimated_seconds {
        log::info!("Service estimates {}s until {} is ready", secs, job.rid);
    }
    log::info!(
        "Collect the results with: qblast fetch {} --format {}",
        job.rid,
        job.format.format_type().to_lowercase()
    );

    // Only the RID goes to stdout so the command composes in scripts
    println!("{}", job.rid);
    Ok(())
}
