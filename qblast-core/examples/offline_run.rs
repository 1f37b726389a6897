//! qblast offline demo
//!
//! Runs the full submit/poll/fetch/parse workflow against a canned in-memory
//! service, so the flow can be inspected without network access.

use std::cell::Cell;
use std::time::Duration;

use qblast_core::{
    OutputConfig, OutputFormat, QblastResult, Report, ServiceRequest, Sleeper, Transport,
    Workflow, WorkflowConfig, WorkflowEvent,
};

/// Pretends the job needs two status checks before it is ready
struct CannedService {
    checks: Cell<u32>,
}

impl Transport for CannedService {
    fn send(&self, request: &ServiceRequest) -> QblastResult<String> {
        let body = match (request.param("CMD"), request.param("FORMAT_OBJECT")) {
            (Some("Put"), _) => "RID = DEMO0001\nRTOE = 5\n".to_string(),
            (Some("Get"), Some("SearchInfo")) => {
                self.checks.set(self.checks.get() + 1);
                let status = if self.checks.get() < 3 { "Status=WAITING" } else { "Status=READY\nThereAreHits=yes" };
                status.to_string()
            }
            _ => include_str!("data/demo_hits.xml").to_string(),
        };
        Ok(body)
    }
}

struct NoSleep;

impl Sleeper for NoSleep {
    fn sleep(&self, duration: Duration) {
        println!("  (would sleep {:?})", duration);
    }
}

fn main() {
    println!("qblast offline workflow demo");
    println!("============================\n");

    let config = WorkflowConfig {
        output: OutputConfig {
            dir: std::env::temp_dir().join("qblast-demo"),
            ..OutputConfig::default()
        },
        ..WorkflowConfig::default()
    };
    let workflow = Workflow::new(config, CannedService { checks: Cell::new(0) }, NoSleep);

    let observer = |event: WorkflowEvent| println!("event: {:?}", event);
    match workflow.run("ATGCGTACGTTAGC", OutputFormat::Xml, &observer) {
        Ok(Report::Matches(report)) => {
            println!("\n{} records ({} skipped), raw XML in {}", report.records.len(), report.skipped_hits, report.path.display());
            for record in &report.records {
                println!(
                    "  {:<24} {:>9} {:>10.2e}  {}",
                    record.target_id,
                    record.identity_label(),
                    record.evalue,
                    record.target_description
                );
            }
        }
        Ok(Report::Text(report)) => println!("{}", report.preview),
        Err(e) => eprintln!("demo failed: {}", e),
    }
}
