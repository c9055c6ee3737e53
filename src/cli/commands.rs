use std::path::Path;

use serde::Serialize;
use serde_json::json;

use crate::app::{cache, AppContext, Result};
use crate::domain::PageData;
use crate::proxy::page_proxy_url;
use crate::sources::mangadex::PopularSort;
use crate::sources::SourceId;
use crate::store::{ReadingMode, ReadingProgress};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn search(
    ctx: &AppContext,
    query: &str,
    source: Option<SourceId>,
    limit: Option<u32>,
    offset: u32,
) -> Result<()> {
    let limit = ctx.config.search.clamp_limit(limit);
    let page = ctx.aggregator.search(query, limit, offset, source).await?;

    tracing::debug!(cache_control = cache::SEARCH, "{} results for {:?}", page.results.len(), query);
    print_json(&page)
}

pub async fn popular(ctx: &AppContext, sort: PopularSort, limit: Option<u32>, offset: u32) -> Result<()> {
    let limit = ctx.config.search.clamp_limit(limit);
    let page = ctx.mangadex.popular(sort, limit, offset).await?;

    tracing::debug!(cache_control = cache::POPULAR, "{} popular titles", page.results.len());
    print_json(&page)
}

pub async fn manga(ctx: &AppContext, id: &str) -> Result<()> {
    let detail = ctx.aggregator.detail(id).await?;

    tracing::debug!(cache_control = cache::DETAIL, "{} chapters for {}", detail.chapters.len(), id);
    print_json(&detail)
}

/// Proxy paths for every page, in reading order.
pub fn page_paths(pages: &PageData, data_saver: bool) -> Vec<String> {
    match pages {
        PageData::Hosted(hosted) => {
            let files = if data_saver && !hosted.pages_saver.is_empty() {
                &hosted.pages_saver
            } else {
                &hosted.pages
            };
            let saver = data_saver && !hosted.pages_saver.is_empty();
            files
                .iter()
                .map(|file| page_proxy_url(hosted, file, saver))
                .collect()
        }
        PageData::Proxied(proxied) => proxied.pages.clone(),
    }
}

pub async fn pages(ctx: &AppContext, id: &str, proxied: bool, data_saver: bool) -> Result<()> {
    let pages = ctx.aggregator.pages(id).await?;

    tracing::debug!(cache_control = cache::PAGES, "{} pages for {}", pages.page_count(), id);
    if proxied {
        print_json(&page_paths(&pages, data_saver))
    } else {
        print_json(&pages)
    }
}

pub async fn download_image(ctx: &AppContext, proxy_path: &str, out: &Path) -> Result<()> {
    let image = ctx.images.fetch(proxy_path).await?;
    std::fs::write(out, &image.body)?;

    print_json(&json!({
        "path": out,
        "contentType": image.content_type,
        "cacheControl": image.cache_control,
        "bytes": image.body.len(),
    }))
}

pub fn list_library(ctx: &AppContext) -> Result<()> {
    print_json(&ctx.reader.library()?)
}

/// Add to the library, looking the title and cover up when no title is given.
pub async fn add_to_library(ctx: &AppContext, id: &str, title: Option<String>) -> Result<bool> {
    let (title, cover_url) = match title {
        Some(title) => (title, String::new()),
        None => {
            let detail = ctx.aggregator.detail(id).await?;
            (detail.title().to_string(), detail.summary.cover_url)
        }
    };

    let added = ctx.reader.add_to_library(id, &title, &cover_url)?;
    if !added {
        tracing::info!("{} is already in the library", id);
    }
    Ok(added)
}

pub fn remove_from_library(ctx: &AppContext, id: &str) -> Result<()> {
    if !ctx.reader.remove_from_library(id)? {
        tracing::info!("{} was not in the library", id);
    }
    Ok(())
}

pub fn list_progress(ctx: &AppContext) -> Result<()> {
    print_json(&ctx.reader.all_progress()?)
}

pub fn show_progress(ctx: &AppContext, manga_id: &str) -> Result<()> {
    print_json(&json!({
        "progress": ctx.reader.progress(manga_id)?,
        "readChapters": ctx.reader.read_chapters(manga_id)?,
        "inLibrary": ctx.reader.is_in_library(manga_id)?,
    }))
}

pub fn save_progress(ctx: &AppContext, progress: ReadingProgress) -> Result<()> {
    ctx.reader
        .mark_chapter_read(&progress.manga_id, &progress.chapter_id)?;
    ctx.reader.save_progress(progress)
}

pub fn get_mode(ctx: &AppContext, manga_id: Option<&str>) -> Result<()> {
    print_json(&ctx.reader.reading_mode(manga_id)?)
}

pub fn set_mode(ctx: &AppContext, mode: ReadingMode, manga_id: Option<&str>) -> Result<()> {
    ctx.reader.set_reading_mode(mode, manga_id)
}
