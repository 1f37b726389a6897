//! Submit → wait-until-ready → fetch → format
//!
//! [`Workflow`] owns its configuration, transport and sleeper, so nothing
//! about the remote service lives in globals. Progress is reported through a
//! [`ProgressObserver`]; the workflow itself stays synchronous and callers that
//! need a responsive front end run it on a worker thread.

use std::cell::Cell;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::config::WorkflowConfig;
use crate::error::QblastResult;
use crate::fetch::fetch_results;
use crate::poll::{CancelFlag, PollOutcome, Sleeper, StatusPoller};
use crate::report::{format_matches, format_text, Report};
use crate::submit::submit;
use crate::transport::Transport;
use crate::types::{Job, JobState, OutputFormat, SearchStatus, StatusReport};

/// Progress notifications emitted while a job moves through its states
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    StateChanged { state: JobState },
    Submitted { rid: String, estimated_seconds: Option<u64> },
    StatusChecked { attempt: u32, status: SearchStatus, has_hits: Option<bool> },
    HitSkipped { index: usize },
    Saved { path: PathBuf },
    Failed { message: String },
}

pub trait ProgressObserver {
    fn on_event(&self, event: WorkflowEvent);
}

impl<F: Fn(WorkflowEvent)> ProgressObserver for F {
    fn on_event(&self, event: WorkflowEvent) {
        self(event)
    }
}

/// Observer that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_event(&self, event: WorkflowEvent) {
        debug!("{:?}", event);
    }
}

/// Tracks the job state and refuses illegal moves
struct StateTracker<'a, O: ProgressObserver + ?Sized> {
    state: Cell<JobState>,
    observer: &'a O,
}

impl<'a, O: ProgressObserver + ?Sized> StateTracker<'a, O> {
    fn new(initial: JobState, observer: &'a O) -> Self {
        observer.on_event(WorkflowEvent::StateChanged { state: initial });
        Self { state: Cell::new(initial), observer }
    }

    fn advance(&self, next: JobState) {
        let current = self.state.get();
        if !current.can_advance_to(next) {
            warn!("Ignoring illegal state change {} -> {}", current, next);
            return;
        }
        if current != next {
            debug!("Job state {} -> {}", current, next);
            self.observer.on_event(WorkflowEvent::StateChanged { state: next });
        }
        self.state.set(next);
    }

    fn fail(&self, message: String) {
        self.advance(JobState::Failed);
        self.observer.on_event(WorkflowEvent::Failed { message });
    }
}

pub struct Workflow<T: Transport, S: Sleeper> {
    config: WorkflowConfig,
    transport: T,
    sleeper: S,
    cancel: CancelFlag,
}

impl<T: Transport, S: Sleeper> Workflow<T, S> {
    pub fn new(config: WorkflowConfig, transport: T, sleeper: S) -> Self {
        Self {
            config,
            transport,
            sleeper,
            cancel: CancelFlag::new(),
        }
    }

    /// Share an externally owned cancellation flag
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn submit(&self, query: &str, format: OutputFormat) -> QblastResult<Job> {
        submit(&self.transport, &self.config.service, query, format)
    }

    /// One status check, no waiting
    pub fn status(&self, rid: &str) -> QblastResult<StatusReport> {
        self.poller().check(&self.transport, rid)
    }

    pub fn wait_until_ready<O: ProgressObserver + ?Sized>(
        &self,
        rid: &str,
        observer: &O,
    ) -> QblastResult<PollOutcome> {
        self.poller().wait(&self.transport, &self.sleeper, rid, |attempt, report| {
            observer.on_event(WorkflowEvent::StatusChecked {
                attempt,
                status: report.status,
                has_hits: report.has_hits,
            });
        })
    }

    pub fn fetch(&self, rid: &str, format: OutputFormat) -> QblastResult<String> {
        fetch_results(&self.transport, rid, format)
    }

    /// Save `body` and build the report for `format`
    pub fn format<O: ProgressObserver + ?Sized>(
        &self,
        body: &str,
        format: OutputFormat,
        observer: &O,
    ) -> QblastResult<Report> {
        let report = match format {
            OutputFormat::Text => Report::Text(format_text(body, &self.config.output)?),
            OutputFormat::Xml => Report::Matches(format_matches(body, &self.config.output, |index| {
                observer.on_event(WorkflowEvent::HitSkipped { index });
            })?),
        };
        observer.on_event(WorkflowEvent::Saved { path: report.path().to_path_buf() });
        Ok(report)
    }

    /// Full run for a new query
    pub fn run<O: ProgressObserver + ?Sized>(
        &self,
        query: &str,
        format: OutputFormat,
        observer: &O,
    ) -> QblastResult<Report> {
        let tracker = StateTracker::new(JobState::Created, observer);
        let result = self.submit(query, format).and_then(|job| {
            tracker.advance(JobState::Submitted);
            observer.on_event(WorkflowEvent::Submitted {
                rid: job.rid.clone(),
                estimated_seconds: job.estimated_seconds,
            });
            self.complete(&job.rid, format, &tracker)
        });
        if let Err(e) = &result {
            tracker.fail(e.to_string());
        }
        result
    }

    /// Pick up a job submitted earlier (for instance by `submit` alone)
    pub fn resume<O: ProgressObserver + ?Sized>(
        &self,
        rid: &str,
        format: OutputFormat,
        observer: &O,
    ) -> QblastResult<Report> {
        let tracker = StateTracker::new(JobState::Submitted, observer);
        let result = self.complete(rid, format, &tracker);
        if let Err(e) = &result {
            tracker.fail(e.to_string());
        }
        result
    }

    fn complete<O: ProgressObserver + ?Sized>(
        &self,
        rid: &str,
        format: OutputFormat,
        tracker: &StateTracker<'_, O>,
    ) -> QblastResult<Report> {
        tracker.advance(JobState::Polling);
        let outcome = self.wait_until_ready(rid, tracker.observer)?;
        tracker.advance(JobState::Ready);
        if outcome.has_hits == Some(false) {
            info!("Service reports no hits for {}", rid);
        }

        let body = self.fetch(rid, format)?;
        tracker.advance(JobState::Fetched);

        let report = self.format(&body, format, tracker.observer)?;
        tracker.advance(JobState::Formatted);
        info!("Job {} complete", rid);
        Ok(report)
    }

    fn poller(&self) -> StatusPoller {
        StatusPoller::new(self.config.poll.clone(), self.cancel.clone())
    }
}
