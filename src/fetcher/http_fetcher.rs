use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::app::Result;
use crate::config::HttpConfig;
use crate::fetcher::{FetchResponse, Fetcher};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str());

        // No timeout unless configured; the transport default applies.
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        tracing::debug!("GET {}", url);
        let response = request.send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?.to_vec();

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_without_timeout() {
        let config = HttpConfig::default();
        assert!(config.timeout_secs.is_none());
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[test]
    fn test_builds_with_timeout() {
        let config = HttpConfig {
            timeout_secs: Some(5),
            ..HttpConfig::default()
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }
}
