//! Versioned JSON snapshots of a bookmark collection

use crate::repository::{validate_bookmarks, validate_categories};
use bookmark_hub_core::*;

/// Snapshot format version written and accepted
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Exported collection document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub categories: Vec<Category>,
    pub bookmarks: Vec<Bookmark>,
}

impl Snapshot {
    pub fn new(collection: &ParsedBookmarks, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            exported_at,
            categories: collection.categories.clone(),
            bookmarks: collection.bookmarks.clone(),
        }
    }

    pub fn into_collection(self) -> ParsedBookmarks {
        ParsedBookmarks::new(self.categories, self.bookmarks)
    }
}

/// Serialize a collection as a pretty-printed snapshot
pub fn export_snapshot(collection: &ParsedBookmarks, exported_at: DateTime<Utc>) -> Result<String> {
    let snapshot = Snapshot::new(collection, exported_at);
    let json = serde_json::to_string_pretty(&snapshot).map_err(StorageError::from)?;
    Ok(json)
}

/// Parse and validate a snapshot document
///
/// The version is checked before the body is decoded, and the decoded
/// collection is validated as a whole.
pub fn import_snapshot(json: &str) -> Result<ParsedBookmarks> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(StorageError::from)?;

    let found = value.get("version").and_then(|v| v.as_str());
    if found != Some(SNAPSHOT_VERSION) {
        return Err(StorageError::UnsupportedVersion {
            found: found.map(str::to_string),
            expected: SNAPSHOT_VERSION.to_string(),
        }
        .into());
    }

    let snapshot: Snapshot = serde_json::from_value(value).map_err(StorageError::from)?;
    validate_categories(&snapshot.categories)?;
    validate_bookmarks(&snapshot.bookmarks)?;

    tracing::info!(
        "Imported snapshot exported at {}: {} categories, {} bookmarks",
        snapshot.exported_at,
        snapshot.categories.len(),
        snapshot.bookmarks.len()
    );

    Ok(snapshot.into_collection())
}
