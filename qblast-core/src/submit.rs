//! Job submission (`CMD=Put`)

use log::{debug, info};

use crate::config::ServiceConfig;
use crate::error::{excerpt, QblastError, QblastResult};
use crate::transport::{ServiceRequest, Transport};
use crate::types::{Job, OutputFormat};

const RID_MARKER: &str = "RID = ";
const RTOE_MARKER: &str = "RTOE = ";

/// Token and time estimate extracted from a submission page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub rid: String,
    pub estimated_seconds: Option<u64>,
}

/// Reject empty queries before any network traffic.
///
/// No further validation is done; the service reports malformed sequences itself.
pub fn validate_query(query: &str) -> QblastResult<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(QblastError::InvalidQuery("query sequence is empty".to_string()));
    }
    Ok(trimmed)
}

/// Pull the job token out of a `CMD=Put` response body
pub fn parse_submission(body: &str) -> QblastResult<SubmissionReceipt> {
    let rid = marker_value(body, RID_MARKER).filter(|rid| !rid.is_empty());

    let Some(rid) = rid else {
        let reason = service_message(body).unwrap_or_else(|| excerpt(body, 120));
        return Err(QblastError::submission(format!("no job token in response ({})", reason)));
    };

    let estimated_seconds = marker_value(body, RTOE_MARKER).and_then(|v| v.parse().ok());

    Ok(SubmissionReceipt {
        rid: rid.to_string(),
        estimated_seconds,
    })
}

/// Submit `query` and return the resulting job
pub fn submit<T: Transport>(
    transport: &T,
    service: &ServiceConfig,
    query: &str,
    format: OutputFormat,
) -> QblastResult<Job> {
    let query = validate_query(query)?;
    debug!("Submitting {} residues to {}/{}", query.len(), service.program, service.database);

    let request = ServiceRequest::put(&service.program, &service.database, query, format);
    let body = transport.send(&request)?;
    let receipt = parse_submission(&body)?;

    info!("Submitted job {}", receipt.rid);
    if let Some(secs) = receipt.estimated_seconds {
        info!("Service estimates {}s until completion", secs);
    }

    Ok(Job {
        rid: receipt.rid,
        program: service.program.clone(),
        database: service.database.clone(),
        query: query.to_string(),
        format,
        estimated_seconds: receipt.estimated_seconds,
    })
}

/// Text following `marker` up to the end of its line
fn marker_value<'a>(body: &'a str, marker: &str) -> Option<&'a str> {
    let start = body.find(marker)? + marker.len();
    let rest = &body[start..];
    let line = rest.split('\n').next().unwrap_or(rest);
    Some(line.trim())
}

/// Error text the service embeds in its HTML pages
fn service_message(body: &str) -> Option<String> {
    body.lines()
        .find(|line| line.contains("Message ID#") || line.contains("class=\"error"))
        .map(strip_tags)
        .filter(|msg| !msg.is_empty())
}

fn strip_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUT_PAGE: &str = "<html>\n<!--QBlastInfoBegin\n    RID = 8ZK1TJ3B016\n    RTOE = 27\nQBlastInfoEnd\n-->\n</html>\n";

    #[test]
    fn test_parse_submission() {
        let receipt = parse_submission(PUT_PAGE).unwrap();
        assert_eq!(receipt.rid, "8ZK1TJ3B016");
        assert_eq!(receipt.estimated_seconds, Some(27));
    }

    #[test]
    fn test_parse_submission_without_estimate() {
        let receipt = parse_submission("RID = ABC\n").unwrap();
        assert_eq!(receipt.rid, "ABC");
        assert_eq!(receipt.estimated_seconds, None);
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = parse_submission("<html>nothing here</html>").unwrap_err();
        assert!(matches!(err, QblastError::Submission { .. }));
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let err = parse_submission("RID = \nRTOE = 10\n").unwrap_err();
        assert!(matches!(err, QblastError::Submission { .. }));
    }

    #[test]
    fn test_service_error_is_reported() {
        let page = "<html>\n<div class=\"error msInf\">Message ID#24 Error: Failed to read the Blast query</div>\n</html>";
        let err = parse_submission(page).unwrap_err();
        assert!(err.to_string().contains("Failed to read the Blast query"));
    }

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("  ACGT\n").unwrap(), "ACGT");
        assert!(matches!(validate_query(" \n\t"), Err(QblastError::InvalidQuery(_))));
    }
}
