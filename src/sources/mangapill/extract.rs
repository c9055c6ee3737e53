//! Field extraction rules for scraped markup.
//!
//! Each rule maps raw HTML to one field and returns `None` (or an empty list)
//! when its pattern no longer matches, so markup drift shows up per field.

use std::sync::LazyLock;

use regex::Regex;

use crate::normalizer::clean_text;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("extraction pattern must compile")
}

static CARD: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"<a href="(/manga/(\d+)/([^"]+))"[^>]*>\s*<figure[^>]*>\s*<img data-src="([^"]+)" alt="([^"]+)""#)
});
static CARD_TITLE: LazyLock<Regex> = LazyLock::new(|| pattern(r"font-black[^>]*>([^<]+)<"));
static CARD_YEAR: LazyLock<Regex> = LazyLock::new(|| pattern(r"bg-orange-500[^>]*>(\d{4})"));
static CARD_STATUS: LazyLock<Regex> = LazyLock::new(|| pattern(r"bg-green-500[^>]*>([^<]+)"));
static CARD_TYPE: LazyLock<Regex> = LazyLock::new(|| pattern(r"bg-purple-500[^>]*>([^<]+)"));

static TITLE: LazyLock<Regex> = LazyLock::new(|| pattern(r"<h1[^>]*>([^<]+)</h1>"));
static COVER: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"<img data-src="([^"]+)"[^>]*class="[^"]*object-cover[^"]*"[^>]*/>"#)
});
static STATUS: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)Status</label>\s*<div>([^<]+)</div>"));
static YEAR: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)Year</label>\s*<div>(\d{4})</div>"));
static GENRE: LazyLock<Regex> = LazyLock::new(|| pattern(r#"/search\?genre=[^"]+">([^<]+)<"#));
static DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<meta name="description" content="([^"]+)""#));
static CHAPTER_LINK: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"href="/chapters/(\d+-\d+)/[^"]*chapter-([^"]+)""#));
static PAGE_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"https://cdn\.readdetectiveconan\.com/file/mangap/[^"'\s]+"#));

/// Markup after a card's anchor that still belongs to the card.
const CARD_TAIL: usize = 200;

/// One search listing entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub manga_id: String,
    pub slug: String,
    pub cover: String,
    pub alt: String,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub status: Option<String>,
    pub kind: Option<String>,
}

impl Card {
    /// `"<id>/<slug>"`, the site's own path key.
    pub fn path(&self) -> String {
        format!("{}/{}", self.manga_id, self.slug)
    }
}

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    index = index.min(s.len());
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Slice from a card anchor to just past the end of its badge block.
fn card_region(html: &str, start: usize, anchor_end: usize) -> &str {
    let end = html[anchor_end..]
        .find("</div>\n")
        .map(|offset| anchor_end + offset + CARD_TAIL)
        .unwrap_or(html.len());
    &html[start..floor_char_boundary(html, end)]
}

pub fn card_title(card_html: &str) -> Option<String> {
    first_capture(&CARD_TITLE, card_html).map(|t| clean_text(&t))
}

pub fn card_year(card_html: &str) -> Option<i32> {
    first_capture(&CARD_YEAR, card_html).and_then(|y| y.parse().ok())
}

pub fn card_status(card_html: &str) -> Option<String> {
    first_capture(&CARD_STATUS, card_html)
}

pub fn card_type(card_html: &str) -> Option<String> {
    first_capture(&CARD_TYPE, card_html)
}

/// Search listing cards in document order, at most `limit`.
pub fn search_cards(html: &str, limit: usize) -> Vec<Card> {
    CARD.captures_iter(html)
        .take(limit)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let region = card_region(html, whole.start(), whole.end());
            Some(Card {
                manga_id: caps[2].to_string(),
                slug: caps[3].to_string(),
                cover: caps[4].to_string(),
                alt: clean_text(&caps[5]),
                title: card_title(region),
                year: card_year(region),
                status: card_status(region),
                kind: card_type(region),
            })
        })
        .collect()
}

pub fn title(html: &str) -> Option<String> {
    first_capture(&TITLE, html).map(|t| clean_text(&t))
}

pub fn cover(html: &str) -> Option<String> {
    first_capture(&COVER, html)
}

pub fn status(html: &str) -> Option<String> {
    first_capture(&STATUS, html)
}

pub fn year(html: &str) -> Option<i32> {
    first_capture(&YEAR, html).and_then(|y| y.parse().ok())
}

pub fn genres(html: &str) -> Vec<String> {
    GENRE
        .captures_iter(html)
        .map(|caps| clean_text(&caps[1]))
        .filter(|g| !g.is_empty())
        .collect()
}

pub fn description(html: &str) -> Option<String> {
    first_capture(&DESCRIPTION, html).map(|d| clean_text(&d))
}

/// `(chapter id, chapter label)` pairs in document order (newest first on the site).
pub fn chapter_links(html: &str) -> Vec<(String, String)> {
    CHAPTER_LINK
        .captures_iter(html)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Absolute CDN image URLs in document order.
pub fn page_images(html: &str) -> Vec<String> {
    PAGE_IMAGE
        .find_iter(html)
        .map(|m| m.as_str().to_string())
        .collect()
}
