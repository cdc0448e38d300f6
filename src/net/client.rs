use crate::{endpoint, error::TransportError};
use reqwest::header::CONTENT_TYPE;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// A response as it came off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

/// POSTs request bodies under a fixed base URL.
///
/// The blocking client is created on first use, since building one inside an
/// async runtime panics.
#[derive(Debug)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
    blocking: OnceLock<reqwest::blocking::Client>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            blocking: OnceLock::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        endpoint::join(&self.base_url, path)
    }

    fn blocking_client(&self) -> Result<&reqwest::blocking::Client, TransportError> {
        if let Some(client) = self.blocking.get() {
            return Ok(client);
        }
        let built = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| TransportError::connection(e.to_string()))?;
        Ok(self.blocking.get_or_init(move || built))
    }

    /// Sends `body` and blocks the calling thread until the response arrives.
    ///
    /// Must not run on an async runtime worker; `MethodStub::call` moves off
    /// the worker first.
    pub fn post_blocking(&self, url: &str, body: Vec<u8>) -> Result<RawResponse, TransportError> {
        trace!(url, body = %String::from_utf8_lossy(&body), "blocking POST");
        let resp = self
            .blocking_client()?
            .post(url)
            .body(body)
            .send()
            .map_err(|e| TransportError::connection(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| TransportError::connection(e.to_string()))?;
        debug!(url, status = status.as_u16(), "blocking response");
        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            body,
        })
    }

    /// Sends `body` as `application/json`.
    pub async fn post(&self, url: &str, body: Vec<u8>) -> Result<RawResponse, TransportError> {
        trace!(url, body = %String::from_utf8_lossy(&body), "POST");
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::connection(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::connection(e.to_string()))?;
        debug!(url, status = status.as_u16(), "response");
        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            body,
        })
    }
}
