use serde::{Deserialize, Serialize};

use crate::domain::ChapterInfo;

/// One manga as it appears in a listing, whichever source produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Namespaced id, see [`crate::sources::router`].
    pub id: String,
    pub title: String,
    /// At most three alternative titles.
    pub alt_titles: Vec<String>,
    pub description: String,
    /// Local proxy path, empty when the source has no cover.
    pub cover_url: String,
    pub status: String,
    pub year: Option<i32>,
    pub tags: Vec<String>,
    pub content_rating: String,
}

impl SearchResult {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            alt_titles: Vec::new(),
            description: String::new(),
            cover_url: String::new(),
            status: "unknown".to_string(),
            year: None,
            tags: Vec::new(),
            content_rating: "safe".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaDetail {
    #[serde(flatten)]
    pub summary: SearchResult,
    pub author: Option<String>,
    pub artist: Option<String>,
    /// Ascending reading order, one entry per dedup key.
    pub chapters: Vec<ChapterInfo>,
}

impl MangaDetail {
    pub fn id(&self) -> &str {
        &self.summary.id
    }

    pub fn title(&self) -> &str {
        &self.summary.title
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub total: u64,
}

impl SearchPage {
    /// A page whose total is just the number of results it carries.
    pub fn counted(results: Vec<SearchResult>) -> Self {
        let total = results.len() as u64;
        Self { results, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_serializes_camel_case() {
        let mut result = SearchResult::new("abc", "Title");
        result.cover_url = "/api/proxy/cover/abc/x.jpg.256.jpg".into();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["coverUrl"], "/api/proxy/cover/abc/x.jpg.256.jpg");
        assert_eq!(json["contentRating"], "safe");
        assert_eq!(json["altTitles"], serde_json::json!([]));
        assert!(json["year"].is_null());
    }

    #[test]
    fn test_detail_flattens_summary() {
        let detail = MangaDetail {
            summary: SearchResult::new("abc", "Title"),
            author: Some("Author".into()),
            artist: None,
            chapters: Vec::new(),
        };
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["id"], "abc");
        assert_eq!(json["title"], "Title");
        assert_eq!(json["author"], "Author");
        assert!(json["artist"].is_null());
        assert_eq!(detail.id(), "abc");
        assert_eq!(detail.title(), "Title");
    }

    #[test]
    fn test_counted_page_total() {
        let page = SearchPage::counted(vec![SearchResult::new("a", "A"), SearchResult::new("b", "B")]);
        assert_eq!(page.total, 2);
    }
}
