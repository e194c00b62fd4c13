//! Parse-time deduplication
//!
//! Two bookmarks are the same when their URLs are equal and their titles
//! match ignoring case. The first occurrence wins.

use bookmark_hub_core::Bookmark;
use std::collections::HashSet;

/// Identity of a bookmark within one import pass
pub fn dedupe_key(bookmark: &Bookmark) -> (String, String) {
    (bookmark.url.clone(), bookmark.title.to_lowercase())
}

/// Return the bookmarks with later duplicates removed, order preserved
pub fn dedupe(bookmarks: &[Bookmark]) -> Vec<Bookmark> {
    let mut seen = HashSet::with_capacity(bookmarks.len());
    bookmarks
        .iter()
        .filter(|b| seen.insert(dedupe_key(b)))
        .cloned()
        .collect()
}

/// Remove later duplicates in place; returns how many were dropped
pub fn dedupe_in_place(bookmarks: &mut Vec<Bookmark>) -> usize {
    let before = bookmarks.len();
    let mut seen = HashSet::with_capacity(before);
    bookmarks.retain(|b| seen.insert(dedupe_key(b)));
    before - bookmarks.len()
}
