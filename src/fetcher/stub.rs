//! Canned-response fetcher for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{MangaplexError, Result};
use crate::fetcher::{FetchResponse, Fetcher};

enum Reply {
    Respond(FetchResponse),
    Fail(String),
}

/// Answers each request with the route whose pattern is the longest
/// substring of the URL; unmatched URLs get a 404.
#[derive(Default)]
pub struct StubFetcher {
    routes: Vec<(String, Reply)>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes.push((
            pattern.to_string(),
            Reply::Respond(FetchResponse {
                status,
                content_type: None,
                body: body.into(),
            }),
        ));
        self
    }

    pub fn route_typed(mut self, pattern: &str, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.routes.push((
            pattern.to_string(),
            Reply::Respond(FetchResponse {
                status: 200,
                content_type: Some(content_type.to_string()),
                body: body.into(),
            }),
        ));
        self
    }

    pub fn json(self, pattern: &str, value: serde_json::Value) -> Self {
        self.route(pattern, 200, value.to_string())
    }

    pub fn fail(mut self, pattern: &str, message: &str) -> Self {
        self.routes
            .push((pattern.to_string(), Reply::Fail(message.to_string())));
        self
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn count_matching(&self, fragment: &str) -> usize {
        self.requested_urls()
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }

    pub fn headers_for(&self, fragment: &str) -> Option<Vec<(String, String)>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|(url, _)| url.contains(fragment))
            .map(|(_, headers)| headers.clone())
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchResponse> {
        self.requests.lock().unwrap().push((
            url.to_string(),
            headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));

        let best = self
            .routes
            .iter()
            .filter(|(pattern, _)| url.contains(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len());

        match best {
            Some((_, Reply::Respond(response))) => Ok(response.clone()),
            Some((_, Reply::Fail(message))) => Err(MangaplexError::Other(message.clone())),
            None => Ok(FetchResponse {
                status: 404,
                content_type: None,
                body: Vec::new(),
            }),
        }
    }
}
