//! Bookmark hub data model
//!
//! Categories and bookmarks produced by an import pass. Both are created once
//! and treated as immutable by the importer; downstream state management may
//! update `tags`, `description` and `last_visited` on bookmarks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Id value used for bookmarks without an owning folder
pub const UNCATEGORIZED_ID: &str = "uncategorized";

/// Display label for the uncategorized sentinel
pub const UNCATEGORIZED_NAME: &str = "未分类";

/// Category identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl CategoryId {
    /// Create a random category id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The "uncategorized" sentinel
    pub fn uncategorized() -> Self {
        Self(UNCATEGORIZED_ID.to_string())
    }

    pub fn is_uncategorized(&self) -> bool {
        self.0 == UNCATEGORIZED_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for CategoryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bookmark identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(pub String);

impl BookmarkId {
    /// Create a random bookmark id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BookmarkId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for BookmarkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BookmarkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A folder heading turned into a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    /// Original folder heading text
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    pub icon: String,
    pub color: String,
    /// Position in first-encounter order
    pub order: u32,
}

/// A single imported link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: BookmarkId,
    pub title: String,
    pub url: String,
    /// Owning category, or the uncategorized sentinel
    pub category: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub favicon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visited: Option<DateTime<Utc>>,
}

impl Bookmark {
    pub fn is_uncategorized(&self) -> bool {
        self.category.is_uncategorized()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Result of parsing one bookmark export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBookmarks {
    pub categories: Vec<Category>,
    pub bookmarks: Vec<Bookmark>,
}

impl ParsedBookmarks {
    pub fn new(categories: Vec<Category>, bookmarks: Vec<Bookmark>) -> Self {
        Self { categories, bookmarks }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.bookmarks.is_empty()
    }
}
