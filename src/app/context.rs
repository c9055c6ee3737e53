use std::path::PathBuf;
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::app::error::{MangaplexError, Result};
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::proxy::ImageProxy;
use crate::sources::{MangaDex, MangaPill, Source};
use crate::store::{ReaderState, SqliteStore};

pub struct AppContext {
    pub config: Config,
    /// Kept apart from the aggregator for the listings only it offers.
    pub mangadex: Arc<MangaDex>,
    pub aggregator: Aggregator,
    pub images: ImageProxy,
    pub reader: ReaderState<SqliteStore>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match &config.store.path {
            Some(p) => p.clone(),
            None => Self::default_db_path()?,
        };

        let store = SqliteStore::new(&db_path)?;
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.http)?);

        Ok(Self::with_parts(config, fetcher, store))
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = SqliteStore::in_memory()?;
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.http)?);

        Ok(Self::with_parts(config, fetcher, store))
    }

    /// Wire every source, the image proxy and reader state onto one fetcher.
    pub fn with_parts(
        config: Config,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        store: SqliteStore,
    ) -> Self {
        let mangadex = Arc::new(MangaDex::new(fetcher.clone(), config.mangadex.clone()));
        let mangapill = Arc::new(MangaPill::new(fetcher.clone(), config.mangapill.clone()));

        let sources: Vec<Arc<dyn Source>> = vec![mangadex.clone() as Arc<dyn Source>, mangapill];
        let aggregator = Aggregator::new(sources);
        let images = ImageProxy::new(
            fetcher,
            config.mangadex.clone(),
            config.mangapill.clone(),
        );

        Self {
            config,
            mangadex,
            aggregator,
            images,
            reader: ReaderState::new(store),
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| MangaplexError::Config("Could not find data directory".into()))?;
        let mangaplex_dir = data_dir.join("mangaplex");
        std::fs::create_dir_all(&mangaplex_dir)?;
        Ok(mangaplex_dir.join("mangaplex.db"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fetcher::stub::StubFetcher;
    use crate::sources::SourceId;

    fn context(stub: StubFetcher) -> (Arc<StubFetcher>, AppContext) {
        let stub = Arc::new(stub);
        let ctx = AppContext::with_parts(Config::default(), stub.clone(), SqliteStore::in_memory().unwrap());
        (stub, ctx)
    }

    fn search_json() -> serde_json::Value {
        json!({
            "result": "ok",
            "data": [{
                "id": "m1",
                "attributes": { "title": { "en": "Frieren" } },
                "relationships": [
                    { "id": "c1", "type": "cover_art", "attributes": { "fileName": "cover.jpg" } }
                ]
            }],
            "total": 37
        })
    }

    #[tokio::test]
    async fn test_search_survives_scraped_source_outage() {
        let (stub, ctx) = context(
            StubFetcher::new()
                .json("api.mangadex.org/manga?", search_json())
                .route("mangapill.com/search", 503, "down"),
        );

        let page = ctx.aggregator.search("frieren", 20, 0, None).await.unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, "m1");
        assert_eq!(page.total, 1);
        assert_eq!(stub.count_matching("mangapill.com/search"), 1);
    }

    #[tokio::test]
    async fn test_search_survives_scraped_source_connection_error() {
        let (stub, ctx) = context(
            StubFetcher::new()
                .json("api.mangadex.org/manga?", search_json())
                .fail("mangapill.com/search", "connection reset"),
        );

        let page = ctx.aggregator.search("frieren", 20, 0, None).await.unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, "m1");
        assert_eq!(page.results[0].cover_url, "/api/proxy/cover/m1/cover.jpg.256.jpg");
        assert_eq!(page.total, page.results.len() as u64);
        assert_eq!(stub.count_matching("mangapill.com/search"), 1);
    }

    #[tokio::test]
    async fn test_single_source_search_keeps_upstream_total() {
        let (_, ctx) = context(StubFetcher::new().json("api.mangadex.org/manga?", search_json()));

        let page = ctx
            .aggregator
            .search("frieren", 20, 0, Some(SourceId::MangaDex))
            .await
            .unwrap();
        assert_eq!(page.total, 37);
    }

    #[tokio::test]
    async fn test_cover_from_search_resolves_through_proxy() {
        let (stub, ctx) = context(
            StubFetcher::new()
                .json("api.mangadex.org/manga?", search_json())
                .route_typed("uploads.mangadex.org/covers/m1/", "image/jpeg", vec![0xff, 0xd8]),
        );

        let page = ctx
            .aggregator
            .search("frieren", 20, 0, Some(SourceId::MangaDex))
            .await
            .unwrap();
        let image = ctx.images.fetch(&page.results[0].cover_url).await.unwrap();

        assert_eq!(image.body, vec![0xff, 0xd8]);
        assert_eq!(
            stub.requested_urls().last().map(String::as_str),
            Some("https://uploads.mangadex.org/covers/m1/cover.jpg.256.jpg")
        );
    }

    #[test]
    fn test_store_path_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.path = Some(dir.path().join("state").join("reader.db"));

        let ctx = AppContext::new(config).unwrap();
        ctx.reader.add_to_library("m1", "Frieren", "").unwrap();

        assert!(dir.path().join("state").join("reader.db").exists());
    }
}
