//! Fetch collaborator: the capability the worker pool calls per job
//!
//! The engine is polymorphic over fetching. Anything implementing [`Fetch`]
//! can drive it; [`HttpFetcher`] is the default reqwest-backed
//! implementation.
//!
//! Following HTTP semantics of the engine: any HTTP response is a fetch
//! success, whatever its status code. Only transport-level failures
//! (timeout, connection refused, malformed URL, body read) are fetch
//! errors, and those are what the driver retries in later rounds.

use crate::engine::{FetchedPage, Job};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Classified failure of one fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("{0}")]
    Other(String),
}

/// Capability interface for fetching one job
///
/// Implementations must return within the given timeout, success or
/// failure, and must not touch any engine state themselves.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, job: &Job, timeout: Duration) -> Result<FetchedPage, FetchError>;
}

/// Builds the HTTP client shared by every worker
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Default [`Fetch`] implementation over reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent)?,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, job: &Job, timeout: Duration) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(&job.url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(FetchedPage {
            url: job.url.clone(),
            final_url,
            status,
            content_type,
            body,
        })
    }
}

fn classify_send_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else if error.is_builder() {
        FetchError::InvalidUrl(error.to_string())
    } else {
        FetchError::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client("kumo-test/0.1");
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_url_is_a_fetch_error() {
        let fetcher = HttpFetcher::new("kumo-test/0.1").unwrap();
        let job = Job::new("not a url at all");

        let result = fetcher.fetch(&job, Duration::from_secs(1)).await;
        assert!(result.is_err());
    }
}
