pub mod memory;
pub mod reader;
pub mod sqlite;

use serde_json::Value;

use crate::app::Result;

pub use memory::MemoryStore;
pub use reader::{LibraryEntry, ReaderState, ReadingMode, ReadingProgress};
pub use sqlite::SqliteStore;

/// Client-local JSON key/value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: &Value) -> Result<()>;
}
