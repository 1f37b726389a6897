//! Run command implementation - submit a query and wait for its results

use anyhow::Result;

use qblast_core::OutputFormat;

use super::{
    print_report, read_query, run_in_background, OutputArgs, PollArgs, QueryArgs, ServiceArgs,
};
use crate::config::Config;

pub fn execute(
    config: &Config,
    quiet: bool,
    query: QueryArgs,
    format: OutputFormat,
    service: ServiceArgs,
    poll: PollArgs,
    output: OutputArgs,
) -> Result<()> {
    let query = read_query(&query)?;

    let mut workflow_config = config.workflow();
    service.apply(&mut workflow_config.service);
    poll.apply(&mut workflow_config.poll);
    output.apply(&mut workflow_config.output);

    log::info!(
        "Searching {} with {} ({} results)",
        workflow_config.service.database,
        workflow_config.service.program,
        format
    );
    log::info!("Results directory: {}", workflow_config.output.dir.display());

    let report = run_in_background(workflow_config, quiet, None, move |workflow, observer| {
        workflow.run(&query, format, observer)
    })?;

    print_report(&report, output.json || config.display.json, quiet)
}
