//! Scraped HTML source.
//!
//! The site keys manga by a path pair `"<numeric id>/<slug>"`. Since ids must
//! be flat strings, the `/` is swapped for `--` (see [`encode_slug`]).

pub mod extract;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use url::form_urlencoded;
use url::Url;

use crate::app::Result;
use crate::config::MangaPillConfig;
use crate::domain::{ChapterInfo, MangaDetail, PageData, ProxiedPages, SearchPage, SearchResult};
use crate::fetcher::Fetcher;
use crate::sources::{endpoint_url, router, Source, SourceId, PROXY_PREFIX};

/// Scanlation group reported for every chapter from this source.
pub const SCANLATION_GROUP: &str = "MangaPill";

/// Page count reported for every chapter; the site always hosts its pages.
const HOSTED_PAGES: u32 = 1;

/// Flatten a path key: `"2/one-piece"` becomes `"2--one-piece"`.
///
/// Only reversible for paths without `--` in them and without a segment
/// ending in `-`. The site's numeric ids and slugs satisfy this; it isn't
/// re-checked here.
pub fn encode_slug(path: &str) -> String {
    path.replace('/', "--")
}

/// Inverse of [`encode_slug`].
pub fn decode_slug(encoded: &str) -> String {
    encoded.replace("--", "/")
}

/// Local proxy path for a CDN image; `kind` is `cover` or `page`.
pub fn proxy_url(kind: &str, target: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{}/mangapill/{}?url={}", PROXY_PREFIX, kind, encoded)
}

pub struct MangaPill {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    config: MangaPillConfig,
}

impl MangaPill {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, config: MangaPillConfig) -> Self {
        Self { fetcher, config }
    }

    fn site_url<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
        params: &[(&str, String)],
    ) -> Result<Url> {
        endpoint_url(&self.config.base_url, segments, params)
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .fetcher
            .get(url, &[("User-Agent", self.config.user_agent.as_str())])
            .await?
            .ensure_success(SourceId::MangaPill)?;
        Ok(response.text())
    }

    fn card_to_result(card: extract::Card) -> SearchResult {
        let mut result = SearchResult::new(
            router::format(SourceId::MangaPill, &encode_slug(&card.path())),
            card.title.clone().unwrap_or_else(|| card.alt.clone()),
        );
        result.cover_url = proxy_url("cover", &card.cover);
        result.status = card.status.unwrap_or_else(|| "unknown".to_string());
        result.year = card.year;
        result.tags = card.kind.into_iter().collect();
        result
    }
}

#[async_trait]
impl Source for MangaPill {
    fn id(&self) -> SourceId {
        SourceId::MangaPill
    }

    /// The site has no paging, so `offset` is ignored and the total is the
    /// number of cards returned.
    async fn search(&self, query: &str, limit: u32, _offset: u32) -> Result<SearchPage> {
        let url = self.site_url(["search"], &[("q", query.to_string())])?;
        let html = self.fetch_html(url.as_str()).await?;

        let results = extract::search_cards(&html, limit as usize)
            .into_iter()
            .map(Self::card_to_result)
            .collect();

        Ok(SearchPage::counted(results))
    }

    async fn detail(&self, raw_id: &str) -> Result<MangaDetail> {
        let path = decode_slug(raw_id);
        // Each half of the key is its own segment.
        let url = self.site_url(std::iter::once("manga").chain(path.split('/')), &[])?;
        let html = self.fetch_html(url.as_str()).await?;

        let mut summary = SearchResult::new(
            router::format(SourceId::MangaPill, &encode_slug(&path)),
            extract::title(&html).unwrap_or_else(|| "Unknown".to_string()),
        );
        summary.description = extract::description(&html).unwrap_or_default();
        summary.cover_url = extract::cover(&html)
            .map(|c| proxy_url("cover", &c))
            .unwrap_or_default();
        summary.status = extract::status(&html).unwrap_or_else(|| "unknown".to_string());
        summary.year = extract::year(&html);
        summary.tags = extract::genres(&html);

        let scraped_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut chapters: Vec<ChapterInfo> = extract::chapter_links(&html)
            .into_iter()
            .map(|(chapter_id, label)| ChapterInfo {
                id: router::format(SourceId::MangaPill, &chapter_id),
                chapter: Some(label),
                title: None,
                volume: None,
                pages: HOSTED_PAGES,
                publish_at: scraped_at.clone(),
                scanlation_group: Some(SCANLATION_GROUP.to_string()),
                external_url: None,
            })
            .collect();
        // Listed newest first.
        chapters.reverse();

        tracing::debug!("Scraped {} chapters for {}", chapters.len(), path);

        Ok(MangaDetail {
            summary,
            author: None,
            artist: None,
            chapters,
        })
    }

    async fn pages(&self, raw_chapter_id: &str) -> Result<PageData> {
        let url = self.site_url(["chapters", raw_chapter_id], &[])?;
        let html = self.fetch_html(url.as_str()).await?;

        let pages = extract::page_images(&html)
            .iter()
            .map(|image| proxy_url("page", image))
            .collect();

        Ok(PageData::Proxied(ProxiedPages { pages }))
    }
}
