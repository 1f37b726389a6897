//! BLAST XML (`FORMAT_TYPE=XML`) hit extraction
//!
//! The document nests `BlastOutput > ... > Iteration_hits > Hit > Hit_hsps > Hsp`.
//! Each `Hit` yields at most one [`MatchRecord`], taken from its first `Hsp`.
//! The whole document must be well-formed; a single structural error fails the
//! parse and no records are returned.

use std::borrow::Cow;

use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::{QblastError, QblastResult};
use crate::types::MatchRecord;

/// Handling of hits that carry no usable alignment block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncompleteHitPolicy {
    /// Drop the hit, log it, and keep going
    #[default]
    Skip,
    /// Fail the whole parse
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub policy: IncompleteHitPolicy,
    pub max_hits: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedHits {
    pub records: Vec<MatchRecord>,
    pub skipped: usize,
}

#[derive(Debug, Default)]
struct HspFields {
    identity: Option<String>,
    align_len: Option<String>,
    evalue: Option<String>,
    qseq: Option<String>,
    hseq: Option<String>,
}

#[derive(Debug, Default)]
struct HitBuilder {
    id: Option<String>,
    def: Option<String>,
    hsp: Option<HspFields>,
    hsp_count: usize,
    in_first_hsp: bool,
}

impl HitBuilder {
    fn open_hsp(&mut self) {
        self.hsp_count += 1;
        self.in_first_hsp = self.hsp_count == 1;
        if self.in_first_hsp {
            self.hsp = Some(HspFields::default());
        }
    }

    fn assign(&mut self, tag: &str, value: String) {
        match tag {
            "Hit_id" => self.id = Some(value),
            "Hit_def" => self.def = Some(value),
            _ if self.in_first_hsp => {
                if let Some(hsp) = self.hsp.as_mut() {
                    match tag {
                        "Hsp_identity" => hsp.identity = Some(value),
                        "Hsp_align-len" => hsp.align_len = Some(value),
                        "Hsp_evalue" => hsp.evalue = Some(value),
                        "Hsp_qseq" => hsp.qseq = Some(value),
                        "Hsp_hseq" => hsp.hseq = Some(value),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    /// `Ok(None)` when a required field is missing
    fn build(self) -> QblastResult<Option<MatchRecord>> {
        let (Some(target_id), Some(hsp)) = (self.id, self.hsp) else {
            return Ok(None);
        };
        let (Some(identity), Some(align_len), Some(evalue), Some(query_seq), Some(target_seq)) =
            (hsp.identity, hsp.align_len, hsp.evalue, hsp.qseq, hsp.hseq)
        else {
            return Ok(None);
        };

        Ok(Some(MatchRecord {
            target_description: self.def.unwrap_or_default(),
            identity: parse_number(&target_id, "Hsp_identity", &identity)?,
            align_len: parse_number(&target_id, "Hsp_align-len", &align_len)?,
            evalue: parse_number(&target_id, "Hsp_evalue", &evalue)?,
            query_seq,
            target_seq,
            target_id,
        }))
    }
}

fn parse_number<N: std::str::FromStr>(hit: &str, tag: &str, value: &str) -> QblastResult<N> {
    value
        .trim()
        .parse()
        .map_err(|_| QblastError::parse(format!("invalid <{}> value {:?} in hit {}", tag, value, hit)))
}

/// Extract match records from a BLAST XML document.
///
/// `on_skip` receives the 1-based position of every hit dropped under
/// [`IncompleteHitPolicy::Skip`].
pub fn parse_hits<F>(xml: &str, options: &ParseOptions, mut on_skip: F) -> QblastResult<ParsedHits>
where
    F: FnMut(usize),
{
    let mut reader = Reader::from_str(xml);
    let mut parsed = ParsedHits::default();
    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut text = String::new();
    let mut hit: Option<HitBuilder> = None;
    let mut hit_index = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                saw_root = true;
                match name.as_str() {
                    "Hit" => {
                        hit_index += 1;
                        hit = Some(HitBuilder::default());
                    }
                    "Hsp" => {
                        if let Some(h) = hit.as_mut() {
                            h.open_hsp();
                        }
                    }
                    _ => {}
                }
                stack.push(name);
                text.clear();
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                saw_root = true;
                match name.as_str() {
                    "Hit" => {
                        hit_index += 1;
                        finish_hit(HitBuilder::default(), hit_index, options, &mut parsed, &mut on_skip)?;
                    }
                    "Hsp" => {
                        if let Some(h) = hit.as_mut() {
                            h.open_hsp();
                            h.in_first_hsp = false;
                        }
                    }
                    _ => {
                        if let Some(h) = hit.as_mut() {
                            h.assign(&name, String::new());
                        }
                    }
                }
            }
            Event::Text(t) => {
                let raw = reader.decoder().decode(&t).map_err(|e| QblastError::parse(e.to_string()))?;
                text.push_str(&unescape(&raw)?);
            }
            Event::CData(c) => {
                let raw = reader.decoder().decode(&c).map_err(|e| QblastError::parse(e.to_string()))?;
                text.push_str(&raw);
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match stack.pop() {
                    Some(open) if open == name => {}
                    Some(open) => {
                        return Err(QblastError::parse(format!(
                            "mismatched closing tag </{}>, expected </{}>",
                            name, open
                        )));
                    }
                    None => return Err(QblastError::parse(format!("unexpected closing tag </{}>", name))),
                }

                match name.as_str() {
                    "Hit" => {
                        if let Some(h) = hit.take() {
                            finish_hit(h, hit_index, options, &mut parsed, &mut on_skip)?;
                        }
                    }
                    "Hsp" => {
                        if let Some(h) = hit.as_mut() {
                            h.in_first_hsp = false;
                        }
                    }
                    _ => {
                        if let Some(h) = hit.as_mut() {
                            h.assign(&name, text.trim().to_string());
                        }
                    }
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(QblastError::parse(format!("document ends inside <{}>", open)));
    }
    if !saw_root {
        return Err(QblastError::parse("document has no root element"));
    }

    debug!("Extracted {} records from {} hits ({} skipped)", parsed.records.len(), hit_index, parsed.skipped);
    Ok(parsed)
}

fn finish_hit<F>(
    builder: HitBuilder,
    index: usize,
    options: &ParseOptions,
    parsed: &mut ParsedHits,
    on_skip: &mut F,
) -> QblastResult<()>
where
    F: FnMut(usize),
{
    match builder.build()? {
        Some(record) => {
            if options.max_hits.map_or(true, |max| parsed.records.len() < max) {
                parsed.records.push(record);
            }
        }
        None => match options.policy {
            IncompleteHitPolicy::Skip => {
                warn!("Skipping hit {}: no complete alignment block", index);
                parsed.skipped += 1;
                on_skip(index);
            }
            IncompleteHitPolicy::Reject => {
                return Err(QblastError::parse(format!("hit {} has no complete alignment block", index)));
            }
        },
    }
    Ok(())
}

fn unescape(raw: &str) -> QblastResult<Cow<'_, str>> {
    quick_xml::escape::unescape(raw).map_err(|e| QblastError::parse(format!("bad entity: {}", e)))
}
