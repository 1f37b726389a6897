//! Turning a fetched body into something to show and keep
//!
//! Both variants save the raw body verbatim to `blast_results.<format>`. The
//! text variant adds a line-limited preview; the XML variant adds the
//! extracted match records.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::config::OutputConfig;
use crate::error::QblastResult;
use crate::types::{MatchRecord, OutputFormat};
use crate::xml::{parse_hits, ParseOptions};

/// Plain-text result
#[derive(Debug, Clone, PartialEq)]
pub struct TextReport {
    pub preview: String,
    pub path: PathBuf,
    pub total_lines: usize,
}

/// Structured result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub records: Vec<MatchRecord>,
    pub skipped_hits: usize,
    pub path: PathBuf,
}

impl MatchReport {
    pub fn to_json_pretty(&self) -> QblastResult<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Text(TextReport),
    Matches(MatchReport),
}

impl Report {
    pub fn path(&self) -> &Path {
        match self {
            Report::Text(r) => &r.path,
            Report::Matches(r) => &r.path,
        }
    }
}

/// The first `max_lines` newline-delimited lines of `body`, or all of it when shorter
pub fn preview(body: &str, max_lines: usize) -> &str {
    if max_lines == 0 {
        return "";
    }
    match body.match_indices('\n').nth(max_lines - 1) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Write `body` unmodified to `<dir>/blast_results.<format>`
pub fn write_result_file(dir: &Path, format: OutputFormat, body: &str) -> QblastResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format.output_file_name());
    fs::write(&path, body.as_bytes())?;
    info!("Saved full result to {}", path.display());
    Ok(path)
}

pub fn format_text(body: &str, output: &OutputConfig) -> QblastResult<TextReport> {
    let path = write_result_file(&output.dir, OutputFormat::Text, body)?;
    Ok(TextReport {
        preview: preview(body, output.preview_lines).to_string(),
        path,
        total_lines: body.lines().count(),
    })
}

/// Save the raw XML, then extract one record per hit.
///
/// `on_skip` is called with the 1-based position of every hit dropped by the
/// skip policy.
pub fn format_matches<F>(body: &str, output: &OutputConfig, on_skip: F) -> QblastResult<MatchReport>
where
    F: FnMut(usize),
{
    let path = write_result_file(&output.dir, OutputFormat::Xml, body)?;
    let options = ParseOptions {
        policy: output.incomplete_hits,
        max_hits: output.max_hits,
    };
    let parsed = parse_hits(body, &options, on_skip)?;
    Ok(MatchReport {
        records: parsed.records,
        skipped_hits: parsed.skipped,
        path,
    })
}
