use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterInfo {
    pub id: String,
    /// Free-form label, not necessarily numeric.
    pub chapter: Option<String>,
    pub title: Option<String>,
    pub volume: Option<String>,
    /// Hosted page count; 0 means external only.
    pub pages: u32,
    /// ISO-8601 timestamp; empty when the upstream sends none.
    pub publish_at: String,
    pub scanlation_group: Option<String>,
    pub external_url: Option<String>,
}

impl ChapterInfo {
    /// Key used to decide two entries are the same chapter.
    pub fn dedup_key(&self) -> &str {
        self.chapter.as_deref().unwrap_or(&self.id)
    }

    pub fn is_hosted(&self) -> bool {
        self.pages > 0
    }
}

/// Structured source page listing: filenames relative to an at-home server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedPages {
    pub base_url: String,
    pub hash: String,
    pub pages: Vec<String>,
    pub pages_saver: Vec<String>,
}

/// Scraped source page listing: already-absolute proxy URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxiedPages {
    pub pages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageData {
    Hosted(HostedPages),
    Proxied(ProxiedPages),
}

impl PageData {
    pub fn page_count(&self) -> usize {
        match self {
            Self::Hosted(hosted) => hosted.pages.len(),
            Self::Proxied(proxied) => proxied.pages.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: &str, label: Option<&str>, pages: u32) -> ChapterInfo {
        ChapterInfo {
            id: id.into(),
            chapter: label.map(String::from),
            title: None,
            volume: None,
            pages,
            publish_at: "2024-01-01T00:00:00+00:00".into(),
            scanlation_group: None,
            external_url: None,
        }
    }

    #[test]
    fn test_dedup_key_prefers_label() {
        assert_eq!(chapter("c1", Some("10"), 0).dedup_key(), "10");
        assert_eq!(chapter("c1", None, 0).dedup_key(), "c1");
    }

    #[test]
    fn test_is_hosted() {
        assert!(chapter("c1", None, 3).is_hosted());
        assert!(!chapter("c1", None, 0).is_hosted());
    }

    #[test]
    fn test_hosted_pages_shape() {
        let data = PageData::Hosted(HostedPages {
            base_url: "https://node.example".into(),
            hash: "h".into(),
            pages: vec!["1.png".into(), "2.png".into()],
            pages_saver: vec!["1.jpg".into(), "2.jpg".into()],
        });
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json["baseUrl"], "https://node.example");
        assert_eq!(json["pagesSaver"][1], "2.jpg");
        assert_eq!(data.page_count(), 2);
    }

    #[test]
    fn test_proxied_pages_shape() {
        let data = PageData::Proxied(ProxiedPages {
            pages: vec!["/api/proxy/mangapill/page?url=x".into()],
        });
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json, serde_json::json!({ "pages": ["/api/proxy/mangapill/page?url=x"] }));
        assert_eq!(data.page_count(), 1);
    }
}
