//! Repository implementations for data access

use async_trait::async_trait;
use bookmark_hub_core::*;
use chrono::SecondsFormat;
use rusqlite::types::Type;
use rusqlite::Row;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio_rusqlite::Connection;

/// Repository trait for bookmarks
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Replace the stored bookmarks with `bookmarks`, all or nothing
    async fn replace_all(&self, bookmarks: &[Bookmark]) -> Result<()>;
    async fn get_all(&self) -> Result<Vec<Bookmark>>;
    async fn get_by_id(&self, id: &BookmarkId) -> Result<Option<Bookmark>>;
    async fn count(&self) -> Result<usize>;
}

/// Repository trait for categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Replace the stored categories with `categories`, all or nothing
    async fn replace_all(&self, categories: &[Category]) -> Result<()>;
    async fn get_all(&self) -> Result<Vec<Category>>;
    async fn get_by_id(&self, id: &CategoryId) -> Result<Option<Category>>;
    async fn count(&self) -> Result<usize>;
}

/// Check a bookmark batch before anything is written
///
/// The first offending record rejects the whole batch.
pub fn validate_bookmarks(bookmarks: &[Bookmark]) -> std::result::Result<(), StorageError> {
    let mut ids = HashSet::with_capacity(bookmarks.len());

    for (index, bookmark) in bookmarks.iter().enumerate() {
        let reason = if bookmark.id.as_str().is_empty() {
            Some("id is empty")
        } else if bookmark.title.trim().is_empty() {
            Some("title is empty")
        } else if bookmark.url.trim().is_empty() {
            Some("url is empty")
        } else if bookmark.category.as_str().is_empty() {
            Some("category is empty")
        } else if !ids.insert(bookmark.id.as_str()) {
            Some("duplicate id")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(StorageError::InvalidRecord {
                index,
                reason: format!("bookmark {}", reason),
            });
        }
    }

    Ok(())
}

/// Check a category batch before anything is written
pub fn validate_categories(categories: &[Category]) -> std::result::Result<(), StorageError> {
    let mut ids = HashSet::with_capacity(categories.len());

    for (index, category) in categories.iter().enumerate() {
        let reason = if category.id.as_str().is_empty() {
            Some("id is empty")
        } else if category.name.trim().is_empty() {
            Some("name is empty")
        } else if !ids.insert(category.id.as_str()) {
            Some("duplicate id")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(StorageError::InvalidRecord {
                index,
                reason: format!("category {}", reason),
            });
        }
    }

    Ok(())
}

/// Map a connection failure into a storage error with context
pub(crate) fn storage_error(context: &'static str) -> impl FnOnce(tokio_rusqlite::Error) -> BookmarkHubError {
    move |e| StorageError::database(format!("{}: {}", context, e)).into()
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Helper function to map a row to Bookmark
fn row_to_bookmark(row: &Row) -> rusqlite::Result<Bookmark> {
    let tags_json: String = row.get(5)?;
    let created_at: String = row.get(8)?;
    let last_visited: Option<String> = row.get(9)?;

    let tags: BTreeSet<String> = serde_json::from_str(&tags_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    Ok(Bookmark {
        id: BookmarkId(row.get(0)?),
        title: row.get(1)?,
        url: row.get(2)?,
        category: CategoryId(row.get(3)?),
        subcategory: row.get(4)?,
        tags,
        favicon: row.get(6)?,
        description: row.get(7)?,
        created_at: parse_timestamp(8, &created_at)?,
        last_visited: last_visited.map(|ts| parse_timestamp(9, &ts)).transpose()?,
    })
}

/// Helper function to map a row to Category
fn row_to_category(row: &Row) -> rusqlite::Result<Category> {
    let parent_id: Option<String> = row.get(2)?;

    Ok(Category {
        id: CategoryId(row.get(0)?),
        name: row.get(1)?,
        parent_id: parent_id.map(CategoryId),
        icon: row.get(3)?,
        color: row.get(4)?,
        order: row.get(5)?,
    })
}

const BOOKMARK_COLUMNS: &str =
    "id, title, url, category, subcategory, tags, favicon, description, created_at, last_visited";

const CATEGORY_COLUMNS: &str = "id, name, parent_id, icon, color, sort_order";

/// Overwrite the bookmarks table; caller owns the transaction
pub(crate) fn write_bookmarks(conn: &rusqlite::Connection, bookmarks: &[Bookmark]) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM bookmarks", [])?;

    let mut stmt = conn.prepare_cached(
        r#"
        INSERT INTO bookmarks
        (id, title, url, category, subcategory, tags, favicon, description, created_at, last_visited, position)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )?;

    for (position, bookmark) in bookmarks.iter().enumerate() {
        let tags_json = serde_json::to_string(&bookmark.tags)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        stmt.execute(rusqlite::params![
            bookmark.id.as_str(),
            bookmark.title,
            bookmark.url,
            bookmark.category.as_str(),
            bookmark.subcategory,
            tags_json,
            bookmark.favicon,
            bookmark.description,
            format_timestamp(&bookmark.created_at),
            bookmark.last_visited.as_ref().map(format_timestamp),
            position as i64,
        ])?;
    }

    Ok(())
}

/// Overwrite the categories table; caller owns the transaction
pub(crate) fn write_categories(conn: &rusqlite::Connection, categories: &[Category]) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM categories", [])?;

    let mut stmt = conn.prepare_cached(
        r#"
        INSERT INTO categories (id, name, parent_id, icon, color, sort_order, position)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )?;

    for (position, category) in categories.iter().enumerate() {
        stmt.execute(rusqlite::params![
            category.id.as_str(),
            category.name,
            category.parent_id.as_ref().map(|p| p.as_str()),
            category.icon,
            category.color,
            category.order,
            position as i64,
        ])?;
    }

    Ok(())
}

pub(crate) fn read_bookmarks(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<Bookmark>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM bookmarks ORDER BY position",
        BOOKMARK_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_bookmark)?;
    rows.collect()
}

pub(crate) fn read_categories(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM categories ORDER BY sort_order, position",
        CATEGORY_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_category)?;
    rows.collect()
}

/// SQLite implementation of BookmarkRepository
pub struct SqliteBookmarkRepository {
    connection: Arc<Connection>,
}

impl SqliteBookmarkRepository {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl BookmarkRepository for SqliteBookmarkRepository {
    async fn replace_all(&self, bookmarks: &[Bookmark]) -> Result<()> {
        validate_bookmarks(bookmarks)?;
        let bookmarks = bookmarks.to_vec();
        let count = bookmarks.len();

        self.connection
            .call(move |conn| {
                let tx = conn.transaction()?;
                write_bookmarks(&tx, &bookmarks)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_error("Failed to save bookmarks"))?;

        tracing::debug!("Stored {} bookmarks", count);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Bookmark>> {
        self.connection
            .call(|conn| Ok(read_bookmarks(conn)?))
            .await
            .map_err(storage_error("Failed to load bookmarks"))
    }

    async fn get_by_id(&self, id: &BookmarkId) -> Result<Option<Bookmark>> {
        let id = id.as_str().to_string();

        self.connection
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM bookmarks WHERE id = ?1",
                    BOOKMARK_COLUMNS
                ))?;

                match stmt.query_row([&id], row_to_bookmark) {
                    Ok(bookmark) => Ok(Some(bookmark)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(storage_error("Failed to get bookmark"))
    }

    async fn count(&self) -> Result<usize> {
        self.connection
            .call(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(storage_error("Failed to count bookmarks"))
    }
}

/// SQLite implementation of CategoryRepository
pub struct SqliteCategoryRepository {
    connection: Arc<Connection>,
}

impl SqliteCategoryRepository {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn replace_all(&self, categories: &[Category]) -> Result<()> {
        validate_categories(categories)?;
        let categories = categories.to_vec();

        self.connection
            .call(move |conn| {
                let tx = conn.transaction()?;
                write_categories(&tx, &categories)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_error("Failed to save categories"))
    }

    async fn get_all(&self) -> Result<Vec<Category>> {
        self.connection
            .call(|conn| Ok(read_categories(conn)?))
            .await
            .map_err(storage_error("Failed to load categories"))
    }

    async fn get_by_id(&self, id: &CategoryId) -> Result<Option<Category>> {
        let id = id.as_str().to_string();

        self.connection
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM categories WHERE id = ?1",
                    CATEGORY_COLUMNS
                ))?;

                match stmt.query_row([&id], row_to_category) {
                    Ok(category) => Ok(Some(category)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(storage_error("Failed to get category"))
    }

    async fn count(&self) -> Result<usize> {
        self.connection
            .call(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(storage_error("Failed to count categories"))
    }
}
