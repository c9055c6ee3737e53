use std::sync::Arc;

use futures::future::join_all;

use crate::app::{MangaplexError, Result};
use crate::domain::{MangaDetail, PageData, SearchPage};
use crate::sources::{router, Source, SourceId};

/// Fronts every registered [`Source`]: fans searches out to all of them and
/// routes id lookups to the one owning the id's namespace.
pub struct Aggregator {
    sources: Vec<Arc<dyn Source>>,
}

impl Aggregator {
    /// `sources` order is the order merged search results come back in.
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self { sources }
    }

    pub fn source(&self, id: SourceId) -> Result<&Arc<dyn Source>> {
        self.sources
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| MangaplexError::UnknownSource(id.to_string()))
    }

    /// Search every source at once and concatenate what succeeded.
    ///
    /// A failing source only loses its own results. `total` is the number of
    /// merged results, not the sum of upstream totals.
    pub async fn search_all(&self, query: &str, limit: u32) -> SearchPage {
        let outcomes = join_all(self.sources.iter().map(|source| async move {
            (source.id(), source.search(query, limit, 0).await)
        }))
        .await;

        let mut results = Vec::new();
        for (source, outcome) in outcomes {
            match outcome {
                Ok(page) => results.extend(page.results),
                Err(e) => tracing::warn!("Search on {} failed, skipping: {}", source, e),
            }
        }

        SearchPage::counted(results)
    }

    /// Validated search entry point: one source when given, otherwise all.
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
        source: Option<SourceId>,
    ) -> Result<SearchPage> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MangaplexError::Validation("missing search query".into()));
        }

        match source {
            Some(id) => self.source(id)?.search(query, limit, offset).await,
            None => Ok(self.search_all(query, limit).await),
        }
    }

    pub async fn detail(&self, id: &str) -> Result<MangaDetail> {
        let parsed = router::parse(id)?;
        self.source(parsed.source)?.detail(&parsed.raw_id).await
    }

    pub async fn pages(&self, chapter_id: &str) -> Result<PageData> {
        let parsed = router::parse(chapter_id)?;
        self.source(parsed.source)?.pages(&parsed.raw_id).await
    }
}
