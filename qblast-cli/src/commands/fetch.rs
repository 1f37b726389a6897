//! Fetch command implementation - wait for a job submitted earlier

use anyhow::Result;

use qblast_core::OutputFormat;

use super::{print_report, run_in_background, OutputArgs, PollArgs};
use crate::config::Config;

pub fn execute(
    config: &Config,
    quiet: bool,
    rid: &str,
    format: OutputFormat,
    poll: PollArgs,
    output: OutputArgs,
) -> Result<()> {
    let mut workflow_config = config.workflow();
    poll.apply(&mut workflow_config.poll);
    output.apply(&mut workflow_config.output);

    log::info!("Collecting {} results for {}", format, rid);

    let owned_rid = rid.to_string();
    let report = run_in_background(workflow_config, quiet, Some(rid), move |workflow, observer| {
        workflow.resume(&owned_rid, format, observer)
    })?;

    print_report(&report, output.json || config.display.json, quiet)
}
