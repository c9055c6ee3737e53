//! # Mangaplex
//!
//! A multi-source manga aggregation core: one search, detail and page
//! interface in front of a JSON API source and a scraped HTML source.
//!
//! ## Architecture
//!
//! ```text
//! Router → Source (Fetcher → parse) → Normalizer → Aggregator
//! ```
//!
//! - [`sources`]: source adapters and the namespaced-id router
//! - [`normalizer`]: chapter dedup and text cleanup
//! - [`aggregator`]: fan-out search and id routing
//! - [`proxy`]: image pass-through for the proxy paths sources emit
//! - [`store`]: client-local reader state
//!
//! ## Quick Start
//!
//! ```bash
//! # Search every source
//! mangaplex search "one piece"
//!
//! # Chapter list for a scraped title
//! mangaplex manga mangapill:2--one-piece
//!
//! # Proxy paths for a chapter's pages
//! mangaplex pages <chapter-id> --proxied
//! ```

/// Application context, errors and cache directives.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// sources, aggregator, image proxy and reader state.
pub mod app;

/// Fan-out search and id routing across sources.
pub mod aggregator;

/// Command-line interface using clap.
///
/// - `search <query>` - Search one or all sources
/// - `popular` - Popular titles
/// - `manga <id>` / `pages <id>` - Detail and chapter pages
/// - `image <path>` - Download through the image proxy
/// - `library`, `progress`, `mode` - Reader state
pub mod cli;

/// Configuration loaded from `~/.config/mangaplex/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`SearchResult`](domain::SearchResult), [`MangaDetail`](domain::MangaDetail)
/// - [`ChapterInfo`](domain::ChapterInfo), [`PageData`](domain::PageData)
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait every source fetches through
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Chapter dedup and scraped-text cleanup.
pub mod normalizer;

/// Image pass-through for `/api/proxy/...` paths.
pub mod proxy;

/// Source adapters and namespaced ids.
pub mod sources;

/// Reader state over a JSON key/value store.
///
/// - [`KeyValueStore`](store::KeyValueStore): get/set capability
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
