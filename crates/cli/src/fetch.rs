use crate::config::{ProxyConfig, ServiceConfig};
use anyhow::{Context as AnyhowContext, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum FetchError {
    #[error("GET {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("GET {url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// The page could not be obtained at all (as opposed to a broken body).
    pub(crate) fn is_unreachable(&self) -> bool {
        !matches!(self, Self::Body { .. })
    }
}

/// Where page bodies come from.
#[async_trait]
pub(crate) trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Scheme and host must both be present.
pub(crate) fn is_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

/// Fetches pages directly, falling back to the configured proxy.
pub(crate) struct HttpFetcher {
    client: Client,
    proxy: Option<ProxyConfig>,
}

impl HttpFetcher {
    pub(crate) fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            proxy: config.proxy.clone(),
        })
    }

    async fn get(&self, url: &str) -> std::result::Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Request {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = match self.get(url).await {
            Ok(response) => response,
            Err(direct) => {
                let Some(proxy) = &self.proxy else {
                    return Err(direct);
                };
                log::warn!("{direct}; retrying through proxy");
                // The proxy URL carries the API key; report errors against the target.
                let via = format!("proxy for {url}");
                self.get(proxy.request_url(url).as_str())
                    .await
                    .map_err(|err| match err {
                        FetchError::Status { status, .. } => FetchError::Status { url: via, status },
                        _ => FetchError::Request {
                            url: via,
                            message: format!("proxy unreachable after direct failure ({direct})"),
                        },
                    })?
            }
        };

        response.text().await.map_err(|err| FetchError::Body {
            url: url.to_string(),
            message: err.to_string(),
        })
    }
}
