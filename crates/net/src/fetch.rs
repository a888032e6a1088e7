use async_trait::async_trait;
use novea_interfaces::{HttpFetch, NetError};
use std::time::Duration;
use url::Url;

/// `HttpFetch` over a shared reqwest client.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, NetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

fn request_error(url: &Url, err: reqwest::Error) -> NetError {
    NetError::Request {
        url: url.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String, NetError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| request_error(url, e))
    }
}
