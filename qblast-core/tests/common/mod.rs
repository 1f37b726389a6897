#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use qblast_core::poll::CancelFlag;
use qblast_core::{QblastError, QblastResult, ServiceRequest, Sleeper, Transport, WorkflowEvent};

pub const PUT_PAGE: &str = "<html>\n<!--QBlastInfoBegin\n    RID = TESTRID0001\n    RTOE = 12\nQBlastInfoEnd\n-->\n</html>\n";
pub const WAITING_PAGE: &str = "<!--QBlastInfoBegin\n\tStatus=WAITING\nQBlastInfoEnd\n-->";
pub const READY_PAGE: &str = "<!--QBlastInfoBegin\n\tStatus=READY\nQBlastInfoEnd\n-->\n<!--QBlastInfoBegin\n\tThereAreHits=yes\nQBlastInfoEnd\n-->";

/// Transport that replays canned responses in order and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<QblastResult<String>>>,
    requests: RefCell<Vec<ServiceRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(body.to_string()));
        self
    }

    pub fn respond_times(self, body: &str, times: usize) -> Self {
        (0..times).fold(self, |t, _| t.respond(body))
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses.borrow_mut().push_back(Err(QblastError::transport(message)));
        self
    }

    pub fn requests(&self) -> Vec<ServiceRequest> {
        self.requests.borrow().clone()
    }

    pub fn status_checks(&self) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.param("FORMAT_OBJECT") == Some("SearchInfo"))
            .count()
    }

    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &ServiceRequest) -> QblastResult<String> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(QblastError::transport("script exhausted")))
    }
}

/// Sleeper that records durations instead of sleeping
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: RefCell<Vec<Duration>>,
    cancel_after: Option<(usize, CancelFlag)>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip `flag` once `count` sleeps have happened
    pub fn cancelling_after(count: usize, flag: CancelFlag) -> Self {
        Self {
            sleeps: RefCell::new(Vec::new()),
            cancel_after: Some((count, flag)),
        }
    }

    pub fn count(&self) -> usize {
        self.sleeps.borrow().len()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        if let Some((count, flag)) = &self.cancel_after {
            if self.sleeps.borrow().len() >= *count {
                flag.cancel();
            }
        }
    }
}

/// Observer collecting every event
#[derive(Default)]
pub struct EventLog {
    pub events: RefCell<Vec<WorkflowEvent>>,
}

impl qblast_core::ProgressObserver for EventLog {
    fn on_event(&self, event: WorkflowEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl EventLog {
    pub fn states(&self) -> Vec<qblast_core::JobState> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::StateChanged { state } => Some(*state),
                _ => None,
            })
            .collect()
    }
}

pub fn blast_xml(hits: &[&str]) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\"?>\n",
            "<!DOCTYPE BlastOutput PUBLIC \"-//NCBI//NCBI BlastOutput/EN\" \"http://www.ncbi.nlm.nih.gov/dtd/NCBI_BlastOutput.dtd\">\n",
            "<BlastOutput>\n",
            "  <BlastOutput_program>blastn</BlastOutput_program>\n",
            "  <BlastOutput_iterations>\n",
            "    <Iteration>\n",
            "      <Iteration_iter-num>1</Iteration_iter-num>\n",
            "      <Iteration_hits>\n{}",
            "      </Iteration_hits>\n",
            "    </Iteration>\n",
            "  </BlastOutput_iterations>\n",
            "</BlastOutput>\n"
        ),
        hits.concat()
    )
}

pub fn xml_hit(id: &str, def: &str, identity: u32, align_len: u32, evalue: &str) -> String {
    format!(
        concat!(
            "<Hit>\n",
            "  <Hit_num>1</Hit_num>\n",
            "  <Hit_id>{}</Hit_id>\n",
            "  <Hit_def>{}</Hit_def>\n",
            "  <Hit_len>1200</Hit_len>\n",
            "  <Hit_hsps>\n",
            "    <Hsp>\n",
            "      <Hsp_num>1</Hsp_num>\n",
            "      <Hsp_bit-score>98.6</Hsp_bit-score>\n",
            "      <Hsp_evalue>{}</Hsp_evalue>\n",
            "      <Hsp_identity>{}</Hsp_identity>\n",
            "      <Hsp_align-len>{}</Hsp_align-len>\n",
            "      <Hsp_qseq>ATGCGTACGT</Hsp_qseq>\n",
            "      <Hsp_hseq>ATGCGTTCGT</Hsp_hseq>\n",
            "      <Hsp_midline>|||||| |||</Hsp_midline>\n",
            "    </Hsp>\n",
            "  </Hit_hsps>\n",
            "</Hit>\n"
        ),
        id, def, evalue, identity, align_len
    )
}

pub fn xml_hit_without_hsp(id: &str) -> String {
    format!(
        "<Hit>\n  <Hit_id>{}</Hit_id>\n  <Hit_def>no alignment</Hit_def>\n  <Hit_hsps>\n  </Hit_hsps>\n</Hit>\n",
        id
    )
}
