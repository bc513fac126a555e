//! reqwest-backed fetchers for doi.org
//!
//! Both fetchers send the CSL-JSON accept header on every request and map
//! non-success statuses to the transport message callers see unchanged.

use citekit_core::fetch::{Fetch, FetchAsync, TransportError};

use crate::CSL_JSON_MIME;

/// Blocking fetcher.
#[derive(Debug, Default)]
pub struct HttpFetch {
    client: reqwest::blocking::Client,
}

impl HttpFetch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fetch for HttpFetch {
    fn fetch(&self, url: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, CSL_JSON_MIME)
            .send()
            .map_err(|e| TransportError::new(e.to_string()))?;
        check_status(response.status())?;
        response.text().map_err(|e| TransportError::new(e.to_string()))
    }
}

/// Async fetcher, for callers already inside a tokio runtime.
#[derive(Debug, Default)]
pub struct HttpFetchAsync {
    client: reqwest::Client,
}

impl HttpFetchAsync {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FetchAsync for HttpFetchAsync {
    async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, CSL_JSON_MIME)
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        check_status(response.status())?;
        response
            .text()
            .await
            .map_err(|e| TransportError::new(e.to_string()))
    }
}

fn check_status(status: reqwest::StatusCode) -> Result<(), TransportError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(TransportError::new(format!(
            "Server responded with status code {}",
            status.as_u16()
        )))
    }
}
