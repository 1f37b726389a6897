//! Bounded status polling (`CMD=Get&FORMAT_OBJECT=SearchInfo`)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::config::PollConfig;
use crate::error::{QblastError, QblastResult};
use crate::transport::{ServiceRequest, Transport};
use crate::types::{SearchStatus, StatusReport};

/// Suspension between status checks
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Blocks in short slices and returns early once `cancel` is set
#[derive(Debug, Clone)]
pub struct CancellableSleeper {
    cancel: CancelFlag,
    slice: Duration,
}

impl CancellableSleeper {
    pub fn new(cancel: CancelFlag) -> Self {
        Self { cancel, slice: Duration::from_millis(200) }
    }
}

impl Sleeper for CancellableSleeper {
    fn sleep(&self, duration: Duration) {
        let mut remaining = duration;
        while !remaining.is_zero() && !self.cancel.is_cancelled() {
            let step = remaining.min(self.slice);
            std::thread::sleep(step);
            remaining -= step;
        }
    }
}

/// Shared flag used to abandon a wait from another thread
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Number of checks issued before the job became ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub attempts: u32,
    pub has_hits: Option<bool>,
}

/// Interpret a SearchInfo body. Markers may appear anywhere in the page; a body
/// without any of them counts as waiting.
pub fn parse_status(body: &str) -> StatusReport {
    let status = if body.contains("Status=READY") {
        SearchStatus::Ready
    } else if body.contains("Status=FAILED") {
        SearchStatus::Failed
    } else if body.contains("Status=UNKNOWN") {
        SearchStatus::Unknown
    } else {
        SearchStatus::Waiting
    };

    let has_hits = if body.contains("ThereAreHits=yes") {
        Some(true)
    } else if body.contains("ThereAreHits=no") {
        Some(false)
    } else {
        None
    };

    StatusReport { status, has_hits }
}

pub struct StatusPoller {
    config: PollConfig,
    cancel: CancelFlag,
}

impl StatusPoller {
    pub fn new(config: PollConfig, cancel: CancelFlag) -> Self {
        Self { config, cancel }
    }

    /// Issue a single status check
    pub fn check<T: Transport>(&self, transport: &T, rid: &str) -> QblastResult<StatusReport> {
        let body = transport.send(&ServiceRequest::search_info(rid))?;
        Ok(parse_status(&body))
    }

    /// Check until the job is ready, sleeping `interval` between checks.
    ///
    /// `on_attempt` sees every status report, including the final one.
    pub fn wait<T, S, F>(
        &self,
        transport: &T,
        sleeper: &S,
        rid: &str,
        mut on_attempt: F,
    ) -> QblastResult<PollOutcome>
    where
        T: Transport,
        S: Sleeper,
        F: FnMut(u32, &StatusReport),
    {
        let interval = self.config.interval();
        let max_attempts = self.config.max_attempts.max(1);
        let max_wait = self.config.max_wait();
        let mut waited = Duration::ZERO;
        let mut attempts = 0u32;

        loop {
            self.ensure_not_cancelled(rid)?;

            attempts += 1;
            let report = self.check(transport, rid)?;
            debug!("Status check {} for {}: {}", attempts, rid, report.status);
            on_attempt(attempts, &report);

            match report.status {
                SearchStatus::Ready => {
                    info!("Job {} ready after {} checks", rid, attempts);
                    return Ok(PollOutcome { attempts, has_hits: report.has_hits });
                }
                SearchStatus::Failed => {
                    return Err(QblastError::JobFailed { rid: rid.to_string() });
                }
                SearchStatus::Unknown => {
                    return Err(QblastError::JobExpired { rid: rid.to_string() });
                }
                SearchStatus::Waiting => {}
            }

            if attempts >= max_attempts {
                return Err(QblastError::PollTimeout { rid: rid.to_string(), attempts });
            }
            if let Some(limit) = max_wait {
                if waited + interval > limit {
                    return Err(QblastError::PollTimeout { rid: rid.to_string(), attempts });
                }
            }

            sleeper.sleep(interval);
            waited += interval;
        }
    }

    fn ensure_not_cancelled(&self, rid: &str) -> QblastResult<()> {
        if self.cancel.is_cancelled() {
            return Err(QblastError::Cancelled { rid: rid.to_string() });
        }
        Ok(())
    }
}
