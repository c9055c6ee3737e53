//! Upstream manga sources and the namespace that routes ids to them.
//!
//! Each [`Source`] translates one upstream's native representation into the
//! shared [`crate::domain`] model. Ids handed out by a source are already
//! namespaced (see [`router`]), so callers never pass a source explicitly.

pub mod mangadex;
pub mod mangapill;
pub mod router;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{MangaplexError, Result};
use crate::domain::{MangaDetail, PageData, SearchPage};

pub use mangadex::MangaDex;
pub use mangapill::MangaPill;
pub use router::ParsedId;

/// Root of every local image proxy path this crate emits.
pub const PROXY_PREFIX: &str = "/api/proxy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    #[value(name = "mangadex")]
    MangaDex,
    #[value(name = "mangapill")]
    MangaPill,
}

impl SourceId {
    /// Aggregator invocation order.
    pub const ALL: [SourceId; 2] = [SourceId::MangaDex, SourceId::MangaPill];

    /// Source used for ids carrying no namespace.
    pub const DEFAULT: SourceId = SourceId::MangaDex;

    pub fn namespace(&self) -> &'static str {
        match self {
            Self::MangaDex => "mangadex",
            Self::MangaPill => "mangapill",
        }
    }

    pub fn from_namespace(namespace: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.namespace() == namespace)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// `base` with each segment appended percent-encoded, so an id can never
/// add path levels or start a query.
pub(crate) fn endpoint_url<'a>(
    base: &str,
    segments: impl IntoIterator<Item = &'a str>,
    params: &[(&str, String)],
) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| MangaplexError::Config(format!("{} cannot take a path", base)))?
        .pop_if_empty()
        .extend(segments);
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// One upstream adapter. Ids taken and returned by these methods are raw
/// (namespace already stripped) on input and namespaced on output.
#[async_trait]
pub trait Source: Send + Sync {
    fn id(&self) -> SourceId;

    async fn search(&self, query: &str, limit: u32, offset: u32) -> Result<SearchPage>;

    async fn detail(&self, raw_id: &str) -> Result<MangaDetail>;

    async fn pages(&self, raw_chapter_id: &str) -> Result<PageData>;
}
