use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{ForecastError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and body of a completed HTTP exchange. Any status counts as
/// completed; classifying it is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport seam: one GET, no retries.
#[async_trait]
pub trait HttpFetch: Send + Sync + Debug {
    async fn get(&self, url: &Url) -> Result<HttpReply>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    http: Client,
}

impl ReqwestFetch {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("forecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ForecastError::network("(http client setup)", e))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn get(&self, url: &Url) -> Result<HttpReply> {
        debug!(%url, "sending GET");

        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ForecastError::network(url.as_str(), e))?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(|e| ForecastError::network(url.as_str(), e))?;

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpReply { status, body })
    }
}
