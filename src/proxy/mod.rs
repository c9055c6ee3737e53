//! Image pass-through for the local proxy paths the sources emit.
//!
//! Upstream image hosts either block hotlinking or check the referer, so
//! covers and pages are served through paths under [`PROXY_PREFIX`]. This
//! module maps such a path back to the upstream URL, fetches it with the
//! headers that host expects and hands the bytes back untouched.

use std::sync::Arc;

use url::{form_urlencoded, Url};

use crate::app::{cache, MangaplexError, Result};
use crate::config::{MangaDexConfig, MangaPillConfig};
use crate::domain::HostedPages;
use crate::fetcher::Fetcher;
use crate::sources::{SourceId, PROXY_PREFIX};

/// Full-quality at-home directory.
pub const QUALITY_DATA: &str = "data";
/// Data-saver at-home directory.
pub const QUALITY_SAVER: &str = "data-saver";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageTarget {
    /// `/cover/{manga_id}/{file_name}`
    Cover { manga_id: String, file_name: String },
    /// `/page/{hash}/{file}?base=..&q=..`
    Page {
        base_url: String,
        quality: String,
        path: String,
    },
    /// `/mangapill/{cover|page}?url=..`
    Scraped { url: String },
}

impl ImageTarget {
    pub fn parse(proxy_path: &str) -> Result<Self> {
        let url = Url::parse("http://localhost")?.join(proxy_path)?;
        let rest = url
            .path()
            .strip_prefix(PROXY_PREFIX)
            .and_then(|p| p.strip_prefix('/'))
            .ok_or_else(|| unrecognized(proxy_path))?;
        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let query = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
        };

        match segments.as_slice() {
            ["cover", manga_id, file_name] => Ok(Self::Cover {
                manga_id: manga_id.to_string(),
                file_name: file_name.to_string(),
            }),
            ["page", path @ ..] if !path.is_empty() => {
                let base_url = query("base")
                    .ok_or_else(|| MangaplexError::Validation("missing base URL".into()))?;
                let quality = query("q").unwrap_or_else(|| QUALITY_DATA.to_string());
                if quality != QUALITY_DATA && quality != QUALITY_SAVER {
                    return Err(MangaplexError::Validation(format!("unknown quality: {}", quality)));
                }
                Ok(Self::Page {
                    base_url,
                    quality,
                    path: path.join("/"),
                })
            }
            ["mangapill", "cover" | "page"] => {
                let url = query("url").ok_or_else(|| MangaplexError::Validation("missing url".into()))?;
                Ok(Self::Scraped { url })
            }
            _ => Err(unrecognized(proxy_path)),
        }
    }

    pub fn source(&self) -> SourceId {
        match self {
            Self::Cover { .. } | Self::Page { .. } => SourceId::MangaDex,
            Self::Scraped { .. } => SourceId::MangaPill,
        }
    }

    fn default_content_type(&self) -> &'static str {
        match self {
            Self::Scraped { .. } => "image/webp",
            _ => "image/jpeg",
        }
    }
}

fn unrecognized(proxy_path: &str) -> MangaplexError {
    MangaplexError::Validation(format!("not a proxy path: {}", proxy_path))
}

/// Proxy path for one at-home page file.
pub fn page_proxy_url(pages: &HostedPages, file_name: &str, data_saver: bool) -> String {
    let quality = if data_saver { QUALITY_SAVER } else { QUALITY_DATA };
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("base", &pages.base_url)
        .append_pair("q", quality)
        .finish();
    format!("{}/page/{}/{}?{}", PROXY_PREFIX, pages.hash, file_name, query)
}

#[derive(Debug, Clone)]
pub struct ProxiedImage {
    pub content_type: String,
    pub cache_control: &'static str,
    pub body: Vec<u8>,
}

pub struct ImageProxy {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    mangadex: MangaDexConfig,
    mangapill: MangaPillConfig,
}

impl ImageProxy {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        mangadex: MangaDexConfig,
        mangapill: MangaPillConfig,
    ) -> Self {
        Self {
            fetcher,
            mangadex,
            mangapill,
        }
    }

    pub fn upstream_url(&self, target: &ImageTarget) -> String {
        match target {
            ImageTarget::Cover { manga_id, file_name } => format!(
                "{}/covers/{}/{}",
                self.mangadex.uploads_url.trim_end_matches('/'),
                manga_id,
                file_name
            ),
            ImageTarget::Page {
                base_url,
                quality,
                path,
            } => format!("{}/{}/{}", base_url.trim_end_matches('/'), quality, path),
            ImageTarget::Scraped { url } => url.clone(),
        }
    }

    /// Fetch the image behind `proxy_path`, keeping only its content type.
    pub async fn fetch(&self, proxy_path: &str) -> Result<ProxiedImage> {
        let target = ImageTarget::parse(proxy_path)?;
        let upstream = self.upstream_url(&target);

        let headers: Vec<(&str, &str)> = match target {
            ImageTarget::Scraped { .. } => vec![
                ("User-Agent", self.mangapill.user_agent.as_str()),
                ("Referer", self.mangapill.referer.as_str()),
            ],
            _ => Vec::new(),
        };

        let response = self
            .fetcher
            .get(&upstream, &headers)
            .await?
            .ensure_success(target.source())?;

        Ok(ProxiedImage {
            content_type: response
                .content_type
                .unwrap_or_else(|| target.default_content_type().to_string()),
            cache_control: cache::IMAGE,
            body: response.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::stub::StubFetcher;
    use crate::sources::mangapill::proxy_url;

    fn proxy(stub: StubFetcher) -> (Arc<StubFetcher>, ImageProxy) {
        let stub = Arc::new(stub);
        let proxy = ImageProxy::new(stub.clone(), MangaDexConfig::default(), MangaPillConfig::default());
        (stub, proxy)
    }

    #[test]
    fn test_parse_cover() {
        let target = ImageTarget::parse("/api/proxy/cover/abc/x.jpg.512.jpg").unwrap();
        assert_eq!(
            target,
            ImageTarget::Cover {
                manga_id: "abc".into(),
                file_name: "x.jpg.512.jpg".into()
            }
        );
        assert_eq!(target.source(), SourceId::MangaDex);
    }

    #[test]
    fn test_page_proxy_url_parses_back() {
        let pages = HostedPages {
            base_url: "https://node.example.org:443/token".into(),
            hash: "h4sh".into(),
            pages: vec!["1.png".into()],
            pages_saver: vec!["1.jpg".into()],
        };

        let path = page_proxy_url(&pages, "1.jpg", true);
        assert_eq!(
            ImageTarget::parse(&path).unwrap(),
            ImageTarget::Page {
                base_url: "https://node.example.org:443/token".into(),
                quality: "data-saver".into(),
                path: "h4sh/1.jpg".into()
            }
        );
    }

    #[test]
    fn test_page_requires_base() {
        let err = ImageTarget::parse("/api/proxy/page/h4sh/1.png?q=data").unwrap_err();
        assert!(matches!(err, MangaplexError::Validation(_)));
    }

    #[test]
    fn test_page_quality_defaults_to_data() {
        let target = ImageTarget::parse("/api/proxy/page/h/1.png?base=https%3A%2F%2Fn.example").unwrap();
        assert!(matches!(target, ImageTarget::Page { ref quality, .. } if quality == "data"));
    }

    #[test]
    fn test_scraped_requires_url() {
        let err = ImageTarget::parse("/api/proxy/mangapill/page").unwrap_err();
        assert!(matches!(err, MangaplexError::Validation(_)));

        let target = ImageTarget::parse(&proxy_url("cover", "https://cdn.example.com/a.jpeg")).unwrap();
        assert_eq!(
            target,
            ImageTarget::Scraped {
                url: "https://cdn.example.com/a.jpeg".into()
            }
        );
    }

    #[test]
    fn test_rejects_foreign_paths() {
        assert!(ImageTarget::parse("/api/manga/search").is_err());
        assert!(ImageTarget::parse("/api/proxy/cover/only-id").is_err());
    }

    #[tokio::test]
    async fn test_cover_fetch_forwards_bytes() {
        let (stub, proxy) = proxy(StubFetcher::new().route_typed(
            "/covers/abc/x.jpg.512.jpg",
            "image/png",
            vec![0x89, 0x50, 0x4e, 0x47],
        ));

        let image = proxy.fetch("/api/proxy/cover/abc/x.jpg.512.jpg").await.unwrap();
        assert_eq!(image.body, vec![0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.cache_control, "public, max-age=604800, immutable");
        assert_eq!(
            stub.requested_urls(),
            vec!["https://uploads.mangadex.org/covers/abc/x.jpg.512.jpg"]
        );
    }

    #[tokio::test]
    async fn test_scraped_fetch_replays_referer_and_ua() {
        let cdn = "https://cdn.readdetectiveconan.com/file/mangap/2/1/1.jpeg";
        let (stub, proxy) = proxy(StubFetcher::new().route(cdn, 200, vec![1, 2, 3]));

        let image = proxy.fetch(&proxy_url("page", cdn)).await.unwrap();
        assert_eq!(image.content_type, "image/webp");

        let headers = stub.headers_for(cdn).unwrap();
        assert!(headers.contains(&("Referer".to_string(), "https://mangapill.com/".to_string())));
        assert!(headers.iter().any(|(k, v)| k == "User-Agent" && v.starts_with("Mozilla/5.0")));
    }

    #[tokio::test]
    async fn test_page_fetch_builds_at_home_url() {
        let (stub, proxy) = proxy(StubFetcher::new().route("/data/h4sh/1.png", 200, vec![7]));

        let image = proxy
            .fetch("/api/proxy/page/h4sh/1.png?base=https%3A%2F%2Fnode.example.org&q=data")
            .await
            .unwrap();
        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(stub.requested_urls(), vec!["https://node.example.org/data/h4sh/1.png"]);
    }

    #[tokio::test]
    async fn test_upstream_failure_keeps_status() {
        let (_, proxy) = proxy(StubFetcher::new().route("/covers/", 404, ""));

        let err = proxy.fetch("/api/proxy/cover/abc/missing.jpg").await.unwrap_err();
        assert!(matches!(
            err,
            MangaplexError::Upstream { provider: SourceId::MangaDex, status: 404 }
        ));
    }
}
