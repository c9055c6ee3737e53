//! Reader state kept on the client: progress, read chapters, library and
//! reading mode. Each concern lives under one key as a JSON document.
//!
//! Values that fail to decode read as the empty fallback, so a corrupt or
//! foreign document never blocks the reader. The next write replaces it.

use std::collections::HashMap;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::{MangaplexError, Result};
use crate::store::KeyValueStore;

const PROGRESS_KEY: &str = "manga_progress";
const READ_KEY: &str = "manga_read_chapters";
const LIBRARY_KEY: &str = "manga_library";
const MODE_KEY: &str = "manga_reading_mode";

/// Mode entry used when a manga has no mode of its own.
pub const DEFAULT_MODE: &str = "_default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub manga_id: String,
    pub chapter_id: String,
    pub chapter_number: Option<String>,
    pub page: u32,
    pub total_pages: u32,
    /// Milliseconds since the epoch, stamped on save.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub manga_title: String,
    #[serde(default)]
    pub cover_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub manga_id: String,
    pub title: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub added_at: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReadingMode {
    #[default]
    Paged,
    Scroll,
}

pub struct ReaderState<S> {
    store: S,
}

impl<S: KeyValueStore> ReaderState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let value = match self.store.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(T::default()),
            Err(MangaplexError::Json(e)) => {
                tracing::warn!("Stored {} is not valid JSON, ignoring: {}", key, e);
                return Ok(T::default());
            }
            Err(e) => return Err(e),
        };

        Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!("Stored {} has an unexpected shape, ignoring: {}", key, e);
            T::default()
        }))
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value: Value = serde_json::to_value(value)?;
        self.store.set(key, &value)
    }

    pub fn progress(&self, manga_id: &str) -> Result<Option<ReadingProgress>> {
        let mut all: HashMap<String, ReadingProgress> = self.load(PROGRESS_KEY)?;
        Ok(all.remove(manga_id))
    }

    /// Every saved progress, most recently read first.
    pub fn all_progress(&self) -> Result<Vec<ReadingProgress>> {
        let all: HashMap<String, ReadingProgress> = self.load(PROGRESS_KEY)?;
        let mut list: Vec<_> = all.into_values().collect();
        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(list)
    }

    pub fn save_progress(&self, progress: ReadingProgress) -> Result<()> {
        self.save_progress_at(progress, Utc::now().timestamp_millis())
    }

    fn save_progress_at(&self, mut progress: ReadingProgress, timestamp: i64) -> Result<()> {
        let mut all: HashMap<String, ReadingProgress> = self.load(PROGRESS_KEY)?;
        progress.timestamp = timestamp;
        all.insert(progress.manga_id.clone(), progress);
        self.save(PROGRESS_KEY, &all)
    }

    /// Chapter ids marked read for a manga, in the order they were marked.
    pub fn read_chapters(&self, manga_id: &str) -> Result<Vec<String>> {
        let mut all: HashMap<String, Vec<String>> = self.load(READ_KEY)?;
        Ok(all.remove(manga_id).unwrap_or_default())
    }

    pub fn mark_chapter_read(&self, manga_id: &str, chapter_id: &str) -> Result<()> {
        let mut all: HashMap<String, Vec<String>> = self.load(READ_KEY)?;
        let chapters = all.entry(manga_id.to_string()).or_default();
        if chapters.iter().any(|c| c == chapter_id) {
            return Ok(());
        }
        chapters.push(chapter_id.to_string());
        self.save(READ_KEY, &all)
    }

    pub fn library(&self) -> Result<Vec<LibraryEntry>> {
        self.load(LIBRARY_KEY)
    }

    /// Returns false when the manga was already in the library.
    pub fn add_to_library(&self, manga_id: &str, title: &str, cover_url: &str) -> Result<bool> {
        let mut library = self.library()?;
        if library.iter().any(|e| e.manga_id == manga_id) {
            return Ok(false);
        }

        library.push(LibraryEntry {
            manga_id: manga_id.to_string(),
            title: title.to_string(),
            cover_url: cover_url.to_string(),
            added_at: Utc::now().timestamp_millis(),
        });
        self.save(LIBRARY_KEY, &library)?;
        Ok(true)
    }

    /// Returns false when the manga wasn't in the library.
    pub fn remove_from_library(&self, manga_id: &str) -> Result<bool> {
        let mut library = self.library()?;
        let before = library.len();
        library.retain(|e| e.manga_id != manga_id);
        if library.len() == before {
            return Ok(false);
        }
        self.save(LIBRARY_KEY, &library)?;
        Ok(true)
    }

    pub fn is_in_library(&self, manga_id: &str) -> Result<bool> {
        Ok(self.library()?.iter().any(|e| e.manga_id == manga_id))
    }

    pub fn reading_mode(&self, manga_id: Option<&str>) -> Result<ReadingMode> {
        let modes: HashMap<String, ReadingMode> = self.load(MODE_KEY)?;
        let mode = manga_id
            .and_then(|id| modes.get(id))
            .or_else(|| modes.get(DEFAULT_MODE))
            .copied()
            .unwrap_or_default();
        Ok(mode)
    }

    /// Setting a manga's mode also makes it the default for manga without one.
    pub fn set_reading_mode(&self, mode: ReadingMode, manga_id: Option<&str>) -> Result<()> {
        let mut modes: HashMap<String, ReadingMode> = self.load(MODE_KEY)?;
        if let Some(id) = manga_id {
            modes.insert(id.to_string(), mode);
        }
        modes.insert(DEFAULT_MODE.to_string(), mode);
        self.save(MODE_KEY, &modes)
    }
}
