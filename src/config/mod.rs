//! Configuration management for Mangaplex.
//!
//! Configuration is read from `~/.config/mangaplex/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mangadex: MangaDexConfig,
    pub mangapill: MangaPillConfig,
    pub http: HttpConfig,
    pub search: SearchConfig,
    pub store: StoreConfig,
}

/// Structured JSON API source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MangaDexConfig {
    pub api_url: String,
    pub uploads_url: String,
    /// Chapters requested per feed page, capped at 500. 0 means 500.
    pub feed_page_size: u32,
    /// Hard ceiling on feed offsets fetched for one manga.
    pub feed_max_items: u32,
    pub translated_language: String,
    pub content_ratings: Vec<String>,
}

impl Default for MangaDexConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.mangadex.org".to_string(),
            uploads_url: "https://uploads.mangadex.org".to_string(),
            feed_page_size: 500,
            feed_max_items: 10_000,
            translated_language: "en".to_string(),
            content_ratings: vec!["safe".to_string(), "suggestive".to_string()],
        }
    }
}

/// Scraped HTML source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MangaPillConfig {
    pub base_url: String,
    /// Browser-like user agent sent with every request to the site and its CDN.
    pub user_agent: String,
    /// Referer the CDN expects on image requests.
    pub referer: String,
}

impl Default for MangaPillConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mangapill.com".to_string(),
            user_agent: DEFAULT_BROWSER_UA.to_string(),
            referer: "https://mangapill.com/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds; unset leaves the transport default.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: concat!("mangaplex/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl SearchConfig {
    /// Clamp a requested limit into `1..=max_limit`, using the default when absent.
    pub fn clamp_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Reader state database; defaults to `<data_dir>/mangaplex/mangaplex.db`.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing the commented default there first
    /// if nothing exists yet.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/mangaplex/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("mangaplex").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# Mangaplex Configuration

[mangadex]
api_url = "https://api.mangadex.org"
uploads_url = "https://uploads.mangadex.org"

# Chapters per feed request (1-500, 0 means 500), and the offset ceiling
# for one manga
feed_page_size = 500
feed_max_items = 10000

translated_language = "en"
content_ratings = ["safe", "suggestive"]

[mangapill]
base_url = "https://mangapill.com"
# The site and its CDN reject non-browser clients
user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
referer = "https://mangapill.com/"

[http]
# Uncomment to bound every upstream request
# timeout_secs = 30

[search]
default_limit = 20
max_limit = 100

[store]
# Reader state database (progress, library, reading mode)
# path = "/path/to/mangaplex.db"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.mangadex.feed_page_size, 500);
        assert_eq!(config.mangadex.feed_max_items, 10_000);
        assert_eq!(config.mangapill.referer, "https://mangapill.com/");
        assert_eq!(config.mangapill.user_agent, DEFAULT_BROWSER_UA);
        assert!(config.http.timeout_secs.is_none());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[mangadex]
feed_page_size = 100
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.mangadex.feed_page_size, 100);
        assert_eq!(config.mangadex.api_url, "https://api.mangadex.org");
        assert_eq!(config.search.max_limit, 100);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");

        assert_eq!(config.mangapill.base_url, "https://mangapill.com");
        assert_eq!(config.mangadex.content_ratings, vec!["safe", "suggestive"]);
    }

    #[test]
    fn test_clamp_limit() {
        let search = SearchConfig::default();
        assert_eq!(search.clamp_limit(None), 20);
        assert_eq!(search.clamp_limit(Some(500)), 100);
        assert_eq!(search.clamp_limit(Some(0)), 1);
        assert_eq!(search.clamp_limit(Some(42)), 42);
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.search.default_limit, 20);

        // Second load parses what was written.
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.mangadex.translated_language, "en");
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search]\ndefault_limit = \"many\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
