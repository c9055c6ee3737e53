//! Structured JSON API source.
//!
//! Every payload is read through the schema structs below. All fields the
//! adapter doesn't strictly need are optional and default when missing, so a
//! sparse payload degrades to default values instead of a parse error.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

use crate::app::Result;
use crate::config::MangaDexConfig;
use crate::domain::{ChapterInfo, HostedPages, MangaDetail, PageData, SearchPage, SearchResult};
use crate::fetcher::Fetcher;
use crate::normalizer::dedup_chapters;
use crate::sources::{endpoint_url, Source, SourceId, PROXY_PREFIX};

pub const UNTITLED: &str = "Untitled";

/// Title locales tried in order before falling back to any locale.
const TITLE_LOCALES: [&str; 3] = ["en", "ja", "ja-ro"];

const MAX_ALT_TITLES: usize = 3;
const POPULAR_MAX_LIMIT: u32 = 40;
/// Largest `limit` the feed endpoint accepts.
const FEED_MAX_PAGE_SIZE: u32 = 500;

/// A locale-keyed string map such as `{"en": "..."}`.
///
/// The API sends an empty array instead of an empty object, so this wraps the
/// raw value and treats anything that isn't an object as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
struct Localized(Value);

impl Localized {
    fn get(&self, locale: &str) -> Option<&str> {
        self.0
            .get(locale)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// First value in document order.
    fn first(&self) -> Option<&str> {
        self.0
            .as_object()
            .and_then(|map| map.values().next())
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Treat an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Collection<T> {
    #[serde(default = "Vec::new", deserialize_with = "nullable")]
    data: Vec<T>,
    #[serde(default, deserialize_with = "nullable")]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct Entity<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
struct Relationship {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    kind: String,
    #[serde(default)]
    attributes: Option<Value>,
}

impl Relationship {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// First relationship of `kind`; later ones of the same kind are ignored.
fn relationship<'a>(relationships: &'a [Relationship], kind: &str) -> Option<&'a Relationship> {
    relationships.iter().find(|r| r.kind == kind)
}

#[derive(Debug, Deserialize)]
struct MangaData {
    id: String,
    #[serde(default, deserialize_with = "nullable")]
    attributes: MangaAttributes,
    #[serde(default, deserialize_with = "nullable")]
    relationships: Vec<Relationship>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MangaAttributes {
    title: Localized,
    #[serde(deserialize_with = "nullable")]
    alt_titles: Vec<Localized>,
    description: Localized,
    status: Option<String>,
    year: Option<i32>,
    content_rating: Option<String>,
    #[serde(deserialize_with = "nullable")]
    tags: Vec<Tag>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Tag {
    #[serde(deserialize_with = "nullable")]
    attributes: TagAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TagAttributes {
    name: Localized,
}

#[derive(Debug, Deserialize)]
struct ChapterData {
    id: String,
    #[serde(default, deserialize_with = "nullable")]
    attributes: ChapterAttributes,
    #[serde(default, deserialize_with = "nullable")]
    relationships: Vec<Relationship>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChapterAttributes {
    chapter: Option<String>,
    title: Option<String>,
    volume: Option<String>,
    pages: Option<u32>,
    publish_at: Option<String>,
    external_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtHome {
    base_url: String,
    chapter: AtHomeChapter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtHomeChapter {
    hash: String,
    #[serde(default, deserialize_with = "nullable")]
    data: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    data_saver: Vec<String>,
}

/// Cover variants served by the uploads host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Thumbnail,
    Full,
}

impl CoverSize {
    pub fn pixels(&self) -> &'static str {
        match self {
            Self::Thumbnail => "256",
            Self::Full => "512",
        }
    }
}

/// Local proxy path for a cover; empty when there is no cover file.
pub fn cover_url(manga_id: &str, file_name: Option<&str>, size: CoverSize) -> String {
    match file_name {
        Some(file_name) if !file_name.is_empty() => format!(
            "{}/cover/{}/{}.{}.jpg",
            PROXY_PREFIX,
            manga_id,
            file_name,
            size.pixels()
        ),
        _ => String::new(),
    }
}

/// Ordering used by [`MangaDex::popular`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PopularSort {
    #[default]
    Followed,
    Rating,
    Latest,
    Relevance,
}

impl PopularSort {
    fn order_param(&self) -> &'static str {
        match self {
            Self::Followed => "order[followedCount]",
            Self::Rating => "order[rating]",
            Self::Latest => "order[latestUploadedChapter]",
            Self::Relevance => "order[relevance]",
        }
    }
}

fn resolve_title(title: &Localized) -> String {
    TITLE_LOCALES
        .iter()
        .find_map(|locale| title.get(locale))
        .or_else(|| title.first())
        .unwrap_or(UNTITLED)
        .to_string()
}

fn summarize(manga: &MangaData, size: CoverSize) -> SearchResult {
    let attrs = &manga.attributes;
    let cover_file = relationship(&manga.relationships, "cover_art").and_then(|r| r.attr("fileName"));

    SearchResult {
        id: manga.id.clone(),
        title: resolve_title(&attrs.title),
        alt_titles: attrs
            .alt_titles
            .iter()
            .filter_map(Localized::first)
            .take(MAX_ALT_TITLES)
            .map(String::from)
            .collect(),
        description: attrs.description.get("en").unwrap_or_default().to_string(),
        cover_url: cover_url(&manga.id, cover_file, size),
        status: attrs.status.clone().unwrap_or_else(|| "unknown".to_string()),
        year: attrs.year,
        tags: attrs
            .tags
            .iter()
            .filter_map(|tag| tag.attributes.name.get("en"))
            .map(String::from)
            .collect(),
        content_rating: attrs
            .content_rating
            .clone()
            .unwrap_or_else(|| "safe".to_string()),
    }
}

fn to_chapter(data: ChapterData) -> ChapterInfo {
    let scanlation_group = relationship(&data.relationships, "scanlation_group")
        .and_then(|r| r.attr("name"))
        .map(String::from);
    let attrs = data.attributes;

    ChapterInfo {
        id: data.id,
        chapter: attrs.chapter,
        title: attrs.title,
        volume: attrs.volume,
        pages: attrs.pages.unwrap_or(0),
        publish_at: attrs.publish_at.unwrap_or_default(),
        scanlation_group,
        external_url: attrs.external_url.filter(|u| !u.is_empty()),
    }
}

pub struct MangaDex {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    config: MangaDexConfig,
}

impl MangaDex {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, config: MangaDexConfig) -> Self {
        Self { fetcher, config }
    }

    fn endpoint(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Url> {
        endpoint_url(&self.config.api_url, segments.iter().copied(), params)
    }

    /// Configured feed page size; 0 means the API maximum.
    fn feed_page_size(&self) -> u32 {
        match self.config.feed_page_size {
            0 => FEED_MAX_PAGE_SIZE,
            size => size.min(FEED_MAX_PAGE_SIZE),
        }
    }

    fn rating_params(&self) -> Vec<(&'static str, String)> {
        self.config
            .content_ratings
            .iter()
            .map(|r| ("contentRating[]", r.clone()))
            .collect()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &Url) -> Result<T> {
        self.fetcher
            .get(url.as_str(), &[])
            .await?
            .ensure_success(SourceId::MangaDex)?
            .json()
    }

    /// Most followed (or otherwise ordered) titles with English chapters.
    pub async fn popular(&self, sort: PopularSort, limit: u32, offset: u32) -> Result<SearchPage> {
        let mut params = vec![
            (sort.order_param(), "desc".to_string()),
            ("limit", limit.clamp(1, POPULAR_MAX_LIMIT).to_string()),
            ("offset", offset.to_string()),
            ("includes[]", "cover_art".to_string()),
            ("hasAvailableChapters", "true".to_string()),
            (
                "availableTranslatedLanguage[]",
                self.config.translated_language.clone(),
            ),
        ];
        params.extend(self.rating_params());

        let url = self.endpoint(&["manga"], &params)?;
        let list: Collection<MangaData> = self.get_json(&url).await?;

        Ok(SearchPage {
            results: list
                .data
                .iter()
                .map(|m| summarize(m, CoverSize::Thumbnail))
                .collect(),
            total: list.total,
        })
    }

    async fn feed_page(&self, manga_id: &str, offset: u32) -> Result<Collection<ChapterData>> {
        let params = [
            ("translatedLanguage[]", self.config.translated_language.clone()),
            ("order[chapter]", "asc".to_string()),
            ("limit", self.feed_page_size().to_string()),
            ("offset", offset.to_string()),
            ("includes[]", "scanlation_group".to_string()),
        ];
        let url = self.endpoint(&["manga", manga_id, "feed"], &params)?;
        self.get_json(&url).await
    }

    /// Whole chapter feed in upstream order. Pages after the first are
    /// requested together once the first reports the total.
    async fn fetch_feed(&self, manga_id: &str) -> Result<Vec<ChapterInfo>> {
        let page_size = self.feed_page_size();
        let first = self.feed_page(manga_id, 0).await?;
        let total = first.total;
        let mut data = first.data;

        if total > u64::from(page_size) {
            let offsets: Vec<u32> = (page_size..)
                .step_by(page_size as usize)
                .take_while(|&offset| u64::from(offset) < total && offset < self.config.feed_max_items)
                .collect();

            tracing::debug!(
                "Feed for {} has {} chapters, fetching {} more pages",
                manga_id,
                total,
                offsets.len()
            );

            let pages = try_join_all(offsets.iter().map(|&offset| self.feed_page(manga_id, offset))).await?;
            for page in pages {
                data.extend(page.data);
            }
        }

        Ok(data.into_iter().map(to_chapter).collect())
    }
}

#[async_trait]
impl Source for MangaDex {
    fn id(&self) -> SourceId {
        SourceId::MangaDex
    }

    async fn search(&self, query: &str, limit: u32, offset: u32) -> Result<SearchPage> {
        let mut params = vec![
            ("title", query.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("includes[]", "cover_art".to_string()),
            ("order[relevance]", "desc".to_string()),
        ];
        params.extend(self.rating_params());

        let url = self.endpoint(&["manga"], &params)?;
        let list: Collection<MangaData> = self.get_json(&url).await?;

        Ok(SearchPage {
            results: list
                .data
                .iter()
                .map(|m| summarize(m, CoverSize::Thumbnail))
                .collect(),
            total: list.total,
        })
    }

    async fn detail(&self, raw_id: &str) -> Result<MangaDetail> {
        let params = [
            ("includes[]", "cover_art".to_string()),
            ("includes[]", "author".to_string()),
            ("includes[]", "artist".to_string()),
        ];
        let url = self.endpoint(&["manga", raw_id], &params)?;

        let (manga, chapters) = futures::join!(
            self.get_json::<Entity<MangaData>>(&url),
            self.fetch_feed(raw_id)
        );
        let manga = manga?.data;
        let chapters = dedup_chapters(chapters?);

        let author = relationship(&manga.relationships, "author")
            .and_then(|r| r.attr("name"))
            .map(String::from);
        let artist = relationship(&manga.relationships, "artist")
            .and_then(|r| r.attr("name"))
            .map(String::from);

        Ok(MangaDetail {
            summary: summarize(&manga, CoverSize::Full),
            author,
            artist,
            chapters,
        })
    }

    async fn pages(&self, raw_chapter_id: &str) -> Result<PageData> {
        let url = self.endpoint(&["at-home", "server", raw_chapter_id], &[])?;
        let at_home: AtHome = self.get_json(&url).await?;

        Ok(PageData::Hosted(HostedPages {
            base_url: at_home.base_url,
            hash: at_home.chapter.hash,
            pages: at_home.chapter.data,
            pages_saver: at_home.chapter.data_saver,
        }))
    }
}
