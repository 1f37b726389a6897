//! Terminal progress for long-running jobs

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use qblast_core::{JobState, SearchStatus, WorkflowEvent};

/// Spinner driven by workflow events. Hidden in quiet mode.
pub struct Progress {
    bar: ProgressBar,
    rid: Option<String>,
}

impl Progress {
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        };
        Self { bar, rid: None }
    }

    pub fn handle(&mut self, event: &WorkflowEvent) {
        if let Some(message) = self.describe(event) {
            self.bar.set_message(message);
        }
    }

    fn describe(&mut self, event: &WorkflowEvent) -> Option<String> {
        match event {
            WorkflowEvent::StateChanged { state } => match state {
                JobState::Created => Some("Submitting query".to_string()),
                JobState::Fetched => Some("Formatting results".to_string()),
                JobState::Ready => Some("Downloading results".to_string()),
                _ => None,
            },
            WorkflowEvent::Submitted { rid, estimated_seconds } => {
                self.rid = Some(rid.clone());
                Some(match estimated_seconds {
                    Some(secs) => format!("Submitted {} (estimated {}s)", rid, secs),
                    None => format!("Submitted {}", rid),
                })
            }
            WorkflowEvent::StatusChecked { attempt, status, .. } => {
                let rid = self.rid.as_deref().unwrap_or("job");
                match status {
                    SearchStatus::Waiting => Some(format!("Waiting for {} (check {})", rid, attempt)),
                    _ => Some(format!("{} is {}", rid, status)),
                }
            }
            WorkflowEvent::HitSkipped { index } => {
                self.bar.println(format!("warning: hit {} has no alignment, skipped", index));
                None
            }
            WorkflowEvent::Saved { path } => Some(format!("Saved {}", path.display())),
            WorkflowEvent::Failed { .. } => None,
        }
    }

    /// Remember a request ID that did not come from a `Submitted` event
    pub fn set_rid(&mut self, rid: &str) {
        self.rid = Some(rid.to_string());
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitted_event_records_rid() {
        let mut progress = Progress::new(true);
        progress.handle(&WorkflowEvent::Submitted {
            rid: "ABC".to_string(),
            estimated_seconds: Some(20),
        });
        assert_eq!(progress.rid.as_deref(), Some("ABC"));
    }

    #[test]
    fn test_status_message_names_rid() {
        let mut progress = Progress::new(true);
        progress.set_rid("XYZ");
        let message = progress.describe(&WorkflowEvent::StatusChecked {
            attempt: 3,
            status: SearchStatus::Waiting,
            has_hits: None,
        });
        assert_eq!(message.as_deref(), Some("Waiting for XYZ (check 3)"));
    }
}
