//! Command implementations for the qblast CLI

pub mod config;
pub mod fetch;
pub mod run;
pub mod status;
pub mod submit;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio::sync::mpsc;

use qblast_core::{
    CancelFlag, CancellableSleeper, HttpTransport, MatchReport, OutputConfig, PollConfig,
    ProgressObserver, QblastResult, Report, ServiceConfig, TextReport, Workflow, WorkflowConfig,
    WorkflowEvent,
};

use crate::error::{CliError, CliResult};
use crate::progress::Progress;

pub type HttpWorkflow = Workflow<HttpTransport, CancellableSleeper>;

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Query sequence (raw or FASTA)
    #[arg(conflicts_with = "query_file")]
    pub sequence: Option<String>,

    /// Read the query from a file, or from stdin with '-'
    #[arg(long)]
    pub query_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// BLAST program (blastn, blastp, megablast, ...)
    #[arg(long)]
    pub program: Option<String>,

    /// Database to search
    #[arg(long)]
    pub database: Option<String>,
}

impl ServiceArgs {
    pub fn apply(&self, service: &mut ServiceConfig) {
        if let Some(program) = &self.program {
            service.program = program.clone();
        }
        if let Some(database) = &self.database {
            service.database = database.clone();
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct PollArgs {
    /// Seconds between status checks
    #[arg(long)]
    pub interval: Option<u64>,

    /// Give up after this many status checks
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Give up after waiting this many seconds in total
    #[arg(long)]
    pub max_wait: Option<u64>,
}

impl PollArgs {
    pub fn apply(&self, poll: &mut PollConfig) {
        if let Some(interval) = self.interval {
            poll.interval_secs = interval;
        }
        if let Some(max_attempts) = self.max_attempts {
            poll.max_attempts = max_attempts;
        }
        if self.max_wait.is_some() {
            poll.max_wait_secs = self.max_wait;
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Directory for the saved result file
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Keep only the first N matches of an XML result
    #[arg(long)]
    pub max_hits: Option<usize>,

    /// Fail on hits without an alignment instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Print XML matches as JSON
    #[arg(long)]
    pub json: bool,
}

impl OutputArgs {
    pub fn apply(&self, output: &mut OutputConfig) {
        if let Some(dir) = &self.output_dir {
            output.dir = dir.clone();
        }
        if self.max_hits.is_some() {
            output.max_hits = self.max_hits;
        }
        if self.strict {
            output.incomplete_hits = qblast_core::IncompleteHitPolicy::Reject;
        }
    }
}

/// Query text from the positional argument, a file, or stdin
pub fn read_query(args: &QueryArgs) -> CliResult<String> {
    match (&args.sequence, &args.query_file) {
        (Some(sequence), _) => Ok(sequence.clone()),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut query = String::new();
            std::io::stdin()
                .read_to_string(&mut query)
                .map_err(|e| CliError::input(format!("failed to read stdin: {}", e)))?;
            Ok(query)
        }
        (None, Some(path)) => {
            if !path.exists() {
                return Err(CliError::file_not_found(path.clone()));
            }
            std::fs::read_to_string(path)
                .map_err(|e| CliError::input(format!("failed to read {}: {}", path.display(), e)))
        }
        (None, None) => Err(CliError::input("no query sequence given")),
    }
}

/// Workflow talking to the live service
pub fn http_workflow(config: WorkflowConfig, cancel: CancelFlag) -> QblastResult<HttpWorkflow> {
    let transport = HttpTransport::new(&config.service)?;
    log::debug!("Using BLAST endpoint {}", transport.base_url());
    let sleeper = CancellableSleeper::new(cancel.clone());
    Ok(Workflow::new(config, transport, sleeper).with_cancel_flag(cancel))
}

/// Run `job` on a blocking worker while the foreground shows progress and
/// turns Ctrl-C into a cancellation of the wait.
pub fn run_in_background<F>(
    config: WorkflowConfig,
    quiet: bool,
    known_rid: Option<&str>,
    job: F,
) -> Result<Report>
where
    F: FnOnce(&HttpWorkflow, &dyn ProgressObserver) -> QblastResult<Report> + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(drive(config, quiet, known_rid, job))
}

async fn drive<F>(
    config: WorkflowConfig,
    quiet: bool,
    known_rid: Option<&str>,
    job: F,
) -> Result<Report>
where
    F: FnOnce(&HttpWorkflow, &dyn ProgressObserver) -> QblastResult<Report> + Send + 'static,
{
    let cancel = CancelFlag::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<WorkflowEvent>();

    let worker_cancel = cancel.clone();
    let mut worker = tokio::task::spawn_blocking(move || {
        let workflow = http_workflow(config, worker_cancel)?;
        let observer = move |event: WorkflowEvent| {
            let _ = tx.send(event);
        };
        job(&workflow, &observer)
    });

    let mut progress = Progress::new(quiet);
    if let Some(rid) = known_rid {
        progress.set_rid(rid);
    }

    let outcome = loop {
        tokio::select! {
            Some(event) = rx.recv() => progress.handle(&event),
            result = &mut worker => break result,
            _ = tokio::signal::ctrl_c() => match on_interrupt(&cancel) {
                Interrupt::CancelWait => {
                    log::warn!("Interrupted, abandoning the wait (press Ctrl-C again to quit now)");
                }
                Interrupt::Exit => {
                    progress.finish();
                    eprintln!("Interrupted again, exiting without waiting for the pending request");
                    std::process::exit(130);
                }
            },
        }
    };

    while let Ok(event) = rx.try_recv() {
        progress.handle(&event);
    }
    progress.finish();

    let report = outcome.context("Workflow task panicked")?.map_err(CliError::from)?;
    Ok(report)
}

/// Response to a Ctrl-C
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    CancelWait,
    Exit,
}

/// The first interrupt cancels the wait; a second one gives up on the
/// blocking request still in flight.
fn on_interrupt(cancel: &CancelFlag) -> Interrupt {
    if cancel.is_cancelled() {
        return Interrupt::Exit;
    }
    cancel.cancel();
    Interrupt::CancelWait
}

/// Print a finished report to stdout
pub fn print_report(report: &Report, json: bool, quiet: bool) -> Result<()> {
    match report {
        Report::Text(text) => print_text(text, quiet),
        Report::Matches(matches) if json => {
            let encoded = matches.to_json_pretty().map_err(CliError::from)?;
            println!("{}", encoded);
        }
        Report::Matches(matches) => print_matches(matches, quiet),
    }
    Ok(())
}

fn print_text(report: &TextReport, quiet: bool) {
    println!("{}", report.preview);
    if !quiet {
        eprintln!("\nFull results ({} lines) saved to {}", report.total_lines, report.path.display());
    }
}

fn print_matches(report: &MatchReport, quiet: bool) {
    if report.records.is_empty() {
        println!("No hits found");
    } else {
        println!("{:<24} {:>11} {:>7} {:>10}  {}", "TARGET", "IDENTITY", "%ID", "E-VALUE", "DESCRIPTION");
        for record in &report.records {
            println!(
                "{:<24} {:>11} {:>6.1}% {:>10.2e}  {}",
                record.target_id,
                record.identity_label(),
                record.percent_identity(),
                record.evalue,
                record.target_description
            );
        }
    }

    if !quiet {
        if report.skipped_hits > 0 {
            eprintln!("\n{} hits without an alignment were skipped", report.skipped_hits);
        }
        eprintln!("\nFull results saved to {}", report.path.display());
    }
}
