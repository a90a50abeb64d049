use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct RapidApiResult {
    pub body: String,
    pub status: StatusCode,
}

impl RapidApiResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// GET client for a single RapidAPI host.
///
/// Every request carries the `x-rapidapi-key` / `x-rapidapi-host` pair. The
/// status is reported back untouched; callers decide what a failure is.
#[derive(Debug, Clone)]
pub struct RapidApiClient {
    http: Client,
    key: String,
    host: String,
    base_url: String,
}

impl RapidApiClient {
    pub fn new(key: &str, host: &str) -> Result<Self, RapidApiRequestError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| RapidApiRequestError::BuildClient { source })?;

        Ok(Self {
            http,
            key: key.to_string(),
            host: host.to_string(),
            base_url: format!("https://{host}"),
        })
    }

    /// Points the client somewhere other than `https://{host}`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<RapidApiResult, RapidApiRequestError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "rapidapi request");

        let response = self
            .http
            .get(&url)
            .header("x-rapidapi-key", &self.key)
            .header("x-rapidapi-host", &self.host)
            .query(query)
            .send()
            .await
            .map_err(|source| RapidApiRequestError::RequestSend { source })?;

        let status = response.status();

        let body = response
            .text()
            .await
            .map_err(|source| RapidApiRequestError::ResponseRead { source })?;

        Ok(RapidApiResult { body, status })
    }
}

#[derive(Debug, Error)]
pub enum RapidApiRequestError {
    #[error("BuildClient: {source}")]
    BuildClient {
        source: reqwest::Error,
    },

    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}
