//! Normalization shared by the source adapters.

use std::collections::HashMap;

use html_escape::decode_html_entities;

use crate::domain::ChapterInfo;

/// Collapse chapter entries sharing a [`ChapterInfo::dedup_key`].
///
/// For each key the first entry wins unless a later one has hosted pages
/// while the current winner has none; a replacement takes the slot of the
/// first occurrence, so relative order of keys is unchanged. An external-only
/// entry that is alone for its key is kept.
pub fn dedup_chapters(chapters: Vec<ChapterInfo>) -> Vec<ChapterInfo> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<ChapterInfo> = Vec::with_capacity(chapters.len());

    for chapter in chapters {
        let existing = slots.get(chapter.dedup_key()).copied();
        match existing {
            Some(slot) => {
                if !out[slot].is_hosted() && chapter.is_hosted() {
                    out[slot] = chapter;
                }
            }
            None => {
                slots.insert(chapter.dedup_key().to_string(), out.len());
                out.push(chapter);
            }
        }
    }

    out
}

/// Decode HTML entities and trim surrounding whitespace.
pub fn clean_text(raw: &str) -> String {
    decode_html_entities(raw.trim()).trim().to_string()
}
