//! Fetch collaborator seam
//!
//! Remote parse steps never talk to the network themselves; they describe
//! the requests they need and the caller supplies a [`Fetch`] (or
//! [`FetchAsync`]) implementation. Tests plug in table-backed fakes, real
//! callers plug in an HTTP client.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

/// Failure reported by a fetch collaborator. The message is propagated to
/// the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

/// Blocking fetch collaborator.
pub trait Fetch {
    /// Resolve a URL to a response body.
    fn fetch(&self, url: &str) -> Result<String, TransportError>;
}

/// Async fetch collaborator, for callers running inside a runtime.
pub trait FetchAsync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// Table-backed fetcher for tests and offline use.
#[derive(Debug, Default, Clone)]
pub struct StaticFetch {
    responses: HashMap<String, Result<String, TransportError>>,
}

impl StaticFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Ok(body.into()));
        self
    }

    pub fn err(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .insert(url.into(), Err(TransportError::new(message)));
        self
    }
}

impl Fetch for StaticFetch {
    fn fetch(&self, url: &str) -> Result<String, TransportError> {
        match self.responses.get(url) {
            Some(result) => result.clone(),
            None => Err(TransportError::new(format!("no response configured for {url}"))),
        }
    }
}

impl FetchAsync for StaticFetch {
    async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        Fetch::fetch(self, url)
    }
}
