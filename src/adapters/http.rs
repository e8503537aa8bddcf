use crate::domain::ports::{ConfigProvider, Document, PageSource};
use crate::utils::error::{FetchError, Result};
use reqwest::Client;
use std::time::Duration;

/// Rate-limited page fetcher. Sleeps a fixed delay before every request and
/// never retries.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    delay: Duration,
}

impl HttpPageFetcher {
    pub fn new(delay: Duration, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, delay })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.request_delay(),
            config.request_timeout(),
            config.user_agent(),
        )
    }
}

#[async_trait::async_trait]
impl PageSource for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Document, FetchError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("{} -> {}", url, status);
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        Ok(Document::new(url, body))
    }
}
