pub mod chapter;
pub mod manga;

pub use chapter::{ChapterInfo, HostedPages, PageData, ProxiedPages};
pub use manga::{MangaDetail, SearchPage, SearchResult};
