//! Database schema definitions and migrations

/// Current schema version
pub const SCHEMA_VERSION: u32 = 1;

/// SQL schema for the bookmark store
pub const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL,
    description TEXT
);

-- Categories, one row per distinct folder heading
CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    parent_id TEXT,
    icon TEXT NOT NULL,
    color TEXT NOT NULL,
    sort_order INTEGER NOT NULL,
    position INTEGER NOT NULL
);

-- Bookmarks; position keeps collection order across round trips
CREATE TABLE IF NOT EXISTS bookmarks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    category TEXT NOT NULL,
    subcategory TEXT,
    tags TEXT NOT NULL, -- JSON array
    favicon TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL, -- RFC 3339, nanoseconds
    last_visited TEXT,
    position INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bookmarks_url ON bookmarks(url);
CREATE INDEX IF NOT EXISTS idx_bookmarks_category ON bookmarks(category);
CREATE INDEX IF NOT EXISTS idx_bookmarks_position ON bookmarks(position);
CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name);
"#;

/// Migration definitions
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// List of all migrations
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Bookmarks and categories",
    sql: SCHEMA_SQL,
}];

/// Get migration by version
pub fn get_migration(version: u32) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.version == version)
}
