//! Result retrieval (`CMD=Get&FORMAT_TYPE=...`)

use log::debug;

use crate::error::{QblastError, QblastResult};
use crate::transport::{ServiceRequest, Transport};
use crate::types::OutputFormat;

/// Download the finished result body in `format`
pub fn fetch_results<T: Transport>(
    transport: &T,
    rid: &str,
    format: OutputFormat,
) -> QblastResult<String> {
    let body = transport.send(&ServiceRequest::results(rid, format))?;
    if body.trim().is_empty() {
        return Err(QblastError::transport(format!("empty {} result body for job {}", format, rid)));
    }
    debug!("Fetched {} bytes of {} output for {}", body.len(), format, rid);
    Ok(body)
}
