pub mod http_fetcher;
#[cfg(test)]
pub(crate) mod stub;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::app::{MangaplexError, Result};
use crate::sources::SourceId;

pub use http_fetcher::HttpFetcher;

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-success status into [`MangaplexError::Upstream`].
    pub fn ensure_success(self, provider: SourceId) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(MangaplexError::Upstream {
                provider,
                status: self.status,
            })
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[async_trait]
pub trait Fetcher {
    /// GET `url` with extra request headers. Non-success statuses are returned,
    /// not raised; only transport failures are errors here.
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchResponse>;
}
