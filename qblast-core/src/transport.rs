//! Request/response plumbing for the BLAST URL API
//!
//! The workflow only ever sees the [`Transport`] trait, so the HTTP client can
//! be swapped for a scripted stub in tests.

use log::debug;
use reqwest::blocking::Client;

use crate::config::ServiceConfig;
use crate::error::{excerpt, QblastError, QblastResult};
use crate::types::OutputFormat;

/// Value of the `CMD` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Put,
    Get,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Put => "Put",
            Command::Get => "Get",
        }
    }
}

/// One call to the service: a command plus its ordered parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub command: Command,
    params: Vec<(&'static str, String)>,
}

impl ServiceRequest {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            params: vec![("CMD", command.as_str().to_string())],
        }
    }

    pub fn with_param<S: Into<String>>(mut self, key: &'static str, value: S) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Submission of a new search
    pub fn put(program: &str, database: &str, query: &str, format: OutputFormat) -> Self {
        Self::new(Command::Put)
            .with_param("PROGRAM", program)
            .with_param("DATABASE", database)
            .with_param("QUERY", query)
            .with_param("FORMAT_TYPE", format.format_type())
    }

    /// Status check for a submitted search
    pub fn search_info(rid: &str) -> Self {
        Self::new(Command::Get)
            .with_param("RID", rid)
            .with_param("FORMAT_OBJECT", "SearchInfo")
    }

    /// Retrieval of the finished result
    pub fn results(rid: &str, format: OutputFormat) -> Self {
        Self::new(Command::Get)
            .with_param("RID", rid)
            .with_param("FORMAT_TYPE", format.format_type())
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Anything able to deliver a [`ServiceRequest`] and hand back the body
pub trait Transport {
    fn send(&self, request: &ServiceRequest) -> QblastResult<String>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ServiceRequest) -> QblastResult<String> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &ServiceRequest) -> QblastResult<String> {
        (**self).send(request)
    }
}

/// Blocking HTTP transport backed by reqwest
pub struct HttpTransport {
    client: Client,
    base_url: String,
    identity: Vec<(&'static str, String)>,
}

impl HttpTransport {
    pub fn new(config: &ServiceConfig) -> QblastResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(format!("{}/{}", config.tool, crate::VERSION))
            .build()?;

        let mut identity = vec![("tool", config.tool.clone())];
        if let Some(email) = &config.email {
            identity.push(("email", email.clone()));
        }

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            identity,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ServiceRequest) -> QblastResult<String> {
        let params: Vec<(&str, &str)> = request
            .params()
            .iter()
            .chain(self.identity.iter())
            .map(|(k, v)| (*k, v.as_str()))
            .collect();

        debug!("{} {} ({} params)", request.command.as_str(), self.base_url, params.len());

        // Queries can be long, so submissions go in a form body
        let builder = match request.command {
            Command::Put => self.client.post(&self.base_url).form(&params),
            Command::Get => self.client.get(&self.base_url).query(&params),
        };

        let response = builder.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(QblastError::transport(format!(
                "HTTP {} from {}: {}",
                status,
                self.base_url,
                excerpt(&body, 200)
            )));
        }

        Ok(body)
    }
}
