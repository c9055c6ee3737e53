//! `Cache-Control` values for whatever HTTP layer serves these results.
//! Nothing is cached server-side.

pub const SEARCH: &str = "public, max-age=300";
pub const DETAIL: &str = "public, max-age=300";
pub const POPULAR: &str = "public, max-age=600";
pub const PAGES: &str = "public, max-age=3600";
/// Proxied images never change under the same URL.
pub const IMAGE: &str = "public, max-age=604800, immutable";
