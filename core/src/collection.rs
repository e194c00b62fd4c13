//! Read-only accessors over an imported collection
//!
//! Lookup, counting and grouping used by persistence and display code.

use crate::types::*;
use std::collections::HashMap;

impl ParsedBookmarks {
    /// Find a category by id
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Find a bookmark by id
    pub fn bookmark(&self, id: &BookmarkId) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| &b.id == id)
    }

    /// Display name for a category id, falling back to the uncategorized label
    pub fn category_name(&self, id: &CategoryId) -> &str {
        self.category(id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNCATEGORIZED_NAME)
    }

    /// Number of bookmarks per category
    ///
    /// Every known category is present, with zero when it holds nothing.
    /// Bookmarks pointing at an unknown id (including the sentinel) are
    /// counted under that id.
    pub fn count_by_category(&self) -> HashMap<CategoryId, usize> {
        let mut counts: HashMap<CategoryId, usize> = self
            .categories
            .iter()
            .map(|c| (c.id.clone(), 0))
            .collect();

        for bookmark in &self.bookmarks {
            *counts.entry(bookmark.category.clone()).or_insert(0) += 1;
        }

        counts
    }

    /// Number of bookmarks in one category
    pub fn count_in_category(&self, id: &CategoryId) -> usize {
        self.bookmarks.iter().filter(|b| &b.category == id).count()
    }

    /// Bookmarks grouped by category
    ///
    /// Groups follow category `order`; empty groups are omitted and
    /// bookmarks without a known category come last under the sentinel id.
    /// Within a group bookmarks are sorted by title.
    pub fn group_by_category(&self) -> Vec<(CategoryId, Vec<&Bookmark>)> {
        let mut ordered: Vec<&Category> = self.categories.iter().collect();
        ordered.sort_by_key(|c| c.order);

        let mut groups: Vec<(CategoryId, Vec<&Bookmark>)> = Vec::new();
        for category in ordered {
            let mut members: Vec<&Bookmark> = self
                .bookmarks
                .iter()
                .filter(|b| b.category == category.id)
                .collect();
            if members.is_empty() {
                continue;
            }
            members.sort_by(|a, b| a.title.cmp(&b.title));
            groups.push((category.id.clone(), members));
        }

        let mut orphans: Vec<&Bookmark> = self
            .bookmarks
            .iter()
            .filter(|b| self.category(&b.category).is_none())
            .collect();
        if !orphans.is_empty() {
            orphans.sort_by(|a, b| a.title.cmp(&b.title));
            groups.push((CategoryId::uncategorized(), orphans));
        }

        groups
    }

    /// Tag frequency, most used first (ties by tag name)
    pub fn tag_stats(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for bookmark in &self.bookmarks {
            for tag in &bookmark.tags {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }

        let mut stats: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats
    }
}
