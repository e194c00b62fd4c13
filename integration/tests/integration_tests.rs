/// End-to-end integration tests for the bookmark hub
///
/// These tests drive the application against an on-disk database: import,
/// repeated import, snapshot export and restore, and failure isolation.

use bookmark_hub_core::types::*;
use data_access::{BookmarkRepository, CategoryRepository};
use integration::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const FIRST_EXPORT: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
    <DT><H3 ADD_DATE="1700000000" PERSONAL_TOOLBAR_FOLDER="true">书签栏</H3>
    <DL><p>
        <DT><H3>开发</H3>
        <DL><p>
            <DT><A HREF="https://github.com/?utm_source=toolbar" ADD_DATE="1700000001">GitHub 开发平台</A>
            <DT><H3>文档</H3>
            <DL><p>
                <DT><A HREF="https://doc.rust-lang.org/std/">Rust std</A>
            </DL><p>
        </DL><p>
        <DT><A HREF="https://news.example.com/">News</A>
    </DL><p>
</DL><p>
"#;

const SECOND_EXPORT: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
    <DT><H3>开发</H3>
    <DL><p>
        <DT><A HREF="https://github.com/?spm=a1">GitHub</A>
        <DT><A HREF="https://crates.io/">crates.io</A>
    </DL><p>
    <DT><H3>工具</H3>
    <DL><p>
        <DT><A HREF="javascript:alert(1)">Bookmarklet</A>
        <DT><A HREF="https://tool.example.com/">Online 工具</A>
    </DL><p>
</DL><p>
"#;

/// Helper to create a test application with a temporary database
async fn setup_test_app() -> (Application, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig {
        database_path: Some(temp_dir.path().join("bookmarks.db")),
        log_level: "debug".to_string(),
        ..AppConfig::default()
    };

    let app = Application::new(config).await.unwrap();
    (app, temp_dir)
}

#[tokio::test]
async fn test_first_import_populates_store() {
    let (app, _dir) = setup_test_app().await;

    let report = app.import_markup(FIRST_EXPORT).await.unwrap();
    assert_eq!(
        report,
        ImportReport {
            total: 3,
            added: 3,
            duplicates: 0,
            new_categories: 2,
        }
    );

    let collection = app.collection().await.unwrap();
    let names: Vec<&str> = collection.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["开发", "文档"]);

    let github = &collection.bookmarks[0];
    assert_eq!(github.url, "https://github.com/");
    assert_eq!(collection.category_name(&github.category), "开发");
    assert!(github.has_tag("开发"));

    let std_docs = &collection.bookmarks[1];
    assert_eq!(collection.category_name(&std_docs.category), "开发");
    assert_eq!(std_docs.subcategory.as_deref(), Some("文档"));

    assert!(collection.bookmarks[2].is_uncategorized());
}

#[tokio::test]
async fn test_second_import_merges_by_url() {
    let (app, _dir) = setup_test_app().await;
    app.import_markup(FIRST_EXPORT).await.unwrap();
    let before = app.collection().await.unwrap();

    let report = app.import_markup(SECOND_EXPORT).await.unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.added, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.new_categories, 1);

    let after = app.collection().await.unwrap();
    assert_eq!(&after.bookmarks[..before.bookmarks.len()], &before.bookmarks[..]);

    // the stored 开发 category is reused, 工具 is appended
    let dev = before.categories.iter().find(|c| c.name == "开发").unwrap();
    let crates = after.bookmarks.iter().find(|b| b.url == "https://crates.io/").unwrap();
    assert_eq!(crates.category, dev.id);

    let tools = after.categories.iter().find(|c| c.name == "工具").unwrap();
    assert_eq!(tools.order, 2);
    assert_eq!(tools.icon, "fa-tools");
    assert!(after.bookmarks.iter().all(|b| !b.url.starts_with("javascript:")));
}

#[tokio::test]
async fn test_reimport_is_all_duplicates() {
    let (app, _dir) = setup_test_app().await;
    app.import_markup(FIRST_EXPORT).await.unwrap();

    let report = app.import_markup(FIRST_EXPORT).await.unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(report.duplicates, report.total);
    assert_eq!(report.new_categories, 0);
    assert_eq!(app.collection().await.unwrap().bookmarks.len(), 3);
}

#[tokio::test]
async fn test_import_file() {
    let (app, _dir) = setup_test_app().await;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SECOND_EXPORT.as_bytes()).unwrap();

    let report = app.import_file(file.path()).await.unwrap();
    assert_eq!(report.added, 3);

    let missing = app.import_file("/nonexistent/bookmarks.html").await.unwrap_err();
    assert!(!missing.is_storage_failure());
}

#[tokio::test]
async fn test_snapshot_export_and_restore() {
    let (app, _dir) = setup_test_app().await;
    app.import_markup(FIRST_EXPORT).await.unwrap();
    let original = app.collection().await.unwrap();

    let json = app.export_snapshot().await.unwrap();

    let (other, _other_dir) = setup_test_app().await;
    let restored = other.restore_snapshot(&json).await.unwrap();
    assert_eq!(restored, original);
    assert_eq!(other.collection().await.unwrap(), original);
}

#[tokio::test]
async fn test_rejected_snapshot_leaves_store_untouched() {
    let (app, _dir) = setup_test_app().await;
    app.import_markup(FIRST_EXPORT).await.unwrap();
    let original = app.collection().await.unwrap();

    let err = app.restore_snapshot(r#"{"categories": [], "bookmarks": []}"#).await.unwrap_err();
    assert!(err.is_storage_failure());
    assert_eq!(app.collection().await.unwrap(), original);

    let stats = app.context().error_handler.get_error_stats().await;
    assert_eq!(stats.warnings, 1);
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig {
        database_path: Some(temp_dir.path().join("bookmarks.db")),
        ..AppConfig::default()
    };

    let app = Application::new(config.clone()).await.unwrap();
    app.import_markup(FIRST_EXPORT).await.unwrap();
    let saved = app.collection().await.unwrap();
    app.shutdown().await.unwrap();
    drop(app);

    let reopened = Application::new(config).await.unwrap();
    assert_eq!(reopened.collection().await.unwrap(), saved);

    let database = &reopened.context().database;
    assert_eq!(database.bookmarks().count().await.unwrap(), 3);
    assert_eq!(database.categories().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_stats() {
    let (app, _dir) = setup_test_app().await;
    app.import_markup(FIRST_EXPORT).await.unwrap();

    let stats = app.get_stats().await.unwrap();
    assert_eq!(stats.total_bookmarks, 3);
    assert_eq!(stats.uncategorized, 1);

    let dev = stats.categories.iter().find(|c| c.name == "开发").unwrap();
    assert_eq!(dev.count, 2);
    let docs = stats.categories.iter().find(|c| c.name == "文档").unwrap();
    assert_eq!(docs.count, 0);

    assert!(stats.tags.iter().any(|(tag, _)| tag == "开发"));
}

#[tokio::test]
async fn test_config_file_drives_importer() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    let db_path = temp_dir.path().join("bookmarks.db");
    std::fs::write(
        &config_path,
        format!(
            r#"{{"database_path": {:?}, "import": {{"excluded_headings": ["书签栏", "开发"]}}}}"#,
            db_path.to_string_lossy()
        ),
    )
    .unwrap();

    let config = AppConfig::load(&config_path).unwrap();
    assert_eq!(config.database_path.as_deref(), Some(db_path.as_path()));

    let app = Application::new(config).await.unwrap();
    app.import_markup(FIRST_EXPORT).await.unwrap();

    let collection = app.collection().await.unwrap();
    let names: Vec<&str> = collection.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["文档"]);
}
