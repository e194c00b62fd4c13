//! Data Access Layer for the bookmark hub
//!
//! Persists categories and bookmarks in SQLite and reads/writes versioned
//! JSON snapshots. Every batch is validated as a whole before a write, and
//! each write runs in a single transaction, so a rejected or failed save
//! leaves the previous state untouched.

pub mod repository;
pub mod schema;
pub mod snapshot;

pub use repository::*;
pub use snapshot::{export_snapshot, import_snapshot, Snapshot, SNAPSHOT_VERSION};

use bookmark_hub_core::*;
use repository::{read_bookmarks, read_categories, storage_error, write_bookmarks, write_categories};
use std::path::Path;
use std::sync::Arc;
use tokio_rusqlite::Connection;

/// Database manager for handling SQLite connections
pub struct DatabaseManager {
    connection: Arc<Connection>,
}

impl DatabaseManager {
    /// Open (or create) the database at `db_path`
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        tracing::info!("Opening bookmark database at {}", path.display());

        let connection = Connection::open(path)
            .await
            .map_err(storage_error("Failed to open database"))?;

        Self::with_connection(connection).await
    }

    /// Create an in-memory database
    pub async fn in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()
            .await
            .map_err(storage_error("Failed to create in-memory database"))?;

        Self::with_connection(connection).await
    }

    async fn with_connection(connection: Connection) -> Result<Self> {
        let manager = Self {
            connection: Arc::new(connection),
        };
        manager.initialize_schema().await?;
        Ok(manager)
    }

    /// Apply the schema and record its version
    async fn initialize_schema(&self) -> Result<()> {
        let applied_at = repository::format_timestamp(&Utc::now());

        self.connection
            .call(move |conn| {
                for migration in schema::MIGRATIONS {
                    conn.execute_batch(migration.sql)?;
                    conn.execute(
                        "INSERT OR IGNORE INTO schema_migrations (version, applied_at, description) \
                         VALUES (?1, ?2, ?3)",
                        rusqlite::params![migration.version, applied_at, migration.description],
                    )?;
                }
                Ok(())
            })
            .await
            .map_err(storage_error("Failed to initialize schema"))
    }

    /// Highest applied schema version
    pub async fn schema_version(&self) -> Result<u32> {
        self.connection
            .call(|conn| {
                let version: Option<u32> =
                    conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))?;
                Ok(version.unwrap_or(0))
            })
            .await
            .map_err(storage_error("Failed to read schema version"))
    }

    /// Get the connection for repository operations
    pub fn connection(&self) -> Arc<Connection> {
        Arc::clone(&self.connection)
    }

    pub fn bookmarks(&self) -> SqliteBookmarkRepository {
        SqliteBookmarkRepository::new(self.connection())
    }

    pub fn categories(&self) -> SqliteCategoryRepository {
        SqliteCategoryRepository::new(self.connection())
    }

    /// Replace both collections in one transaction
    pub async fn save_collection(&self, collection: &ParsedBookmarks) -> Result<()> {
        validate_categories(&collection.categories)?;
        validate_bookmarks(&collection.bookmarks)?;

        let collection = collection.clone();
        let (categories, bookmarks) = (collection.categories.len(), collection.bookmarks.len());

        self.connection
            .call(move |conn| {
                let tx = conn.transaction()?;
                write_categories(&tx, &collection.categories)?;
                write_bookmarks(&tx, &collection.bookmarks)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_error("Failed to save collection"))?;

        tracing::info!("Saved {} categories and {} bookmarks", categories, bookmarks);
        Ok(())
    }

    /// Load both collections from one consistent read
    pub async fn load_collection(&self) -> Result<ParsedBookmarks> {
        self.connection
            .call(|conn| {
                let tx = conn.transaction()?;
                let categories = read_categories(&tx)?;
                let bookmarks = read_bookmarks(&tx)?;
                tx.commit()?;
                Ok(ParsedBookmarks::new(categories, bookmarks))
            })
            .await
            .map_err(storage_error("Failed to load collection"))
    }
}
