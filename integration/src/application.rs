/// Main application module
///
/// Provides the high-level Application API

use crate::{AppConfig, AppContext, UnifiedLogger};
use bookmark_hub_core::errors::{Result, SystemError};
use bookmark_hub_core::types::*;
use bookmark_importer::{merge, RandomIds};
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Outcome of one "import more bookmarks" run
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImportReport {
    /// Bookmarks found in the export after parse-time dedupe
    pub total: usize,
    pub added: usize,
    /// Skipped because their URL was already stored
    pub duplicates: usize,
    pub new_categories: usize,
}

/// Per-category bookmark count
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CategoryStat {
    pub id: CategoryId,
    pub name: String,
    pub count: usize,
    pub icon: String,
    pub color: String,
}

/// Collection overview
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CollectionStats {
    pub total_bookmarks: usize,
    pub uncategorized: usize,
    pub categories: Vec<CategoryStat>,
    pub tags: Vec<(String, usize)>,
}

/// Main application
pub struct Application {
    /// Application context
    context: Arc<AppContext>,
    /// Serializes read-merge-write cycles against the store
    write_lock: Mutex<()>,
}

impl Application {
    /// Create and initialize a new application
    pub async fn new(config: AppConfig) -> Result<Self> {
        if let Err(e) = UnifiedLogger::init(config.logger_config()) {
            debug!("Logger not installed: {}", e);
        }

        info!("Starting bookmark hub");

        let context = Arc::new(AppContext::new(config).await?);

        info!("Application initialized successfully");

        Ok(Self {
            context,
            write_lock: Mutex::new(()),
        })
    }

    /// Shutdown the application
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down application");
        self.context.shutdown().await?;
        info!("Application shutdown complete");
        Ok(())
    }

    /// Get application context
    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    /// Route a failure through the error handler before returning it
    async fn report<T>(&self, context: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.context.error_handler.handle_error(e, context).await;
        }
        result
    }

    /// Import an export into the stored collection
    ///
    /// Parsed categories are matched to stored ones by name; stored ids win
    /// and unmatched categories are appended after the highest stored order.
    /// Bookmarks whose URL is already stored are counted as duplicates. The
    /// stored collection is replaced in a single transaction, so a failed
    /// save leaves it unchanged.
    pub async fn import_markup(&self, markup: &str) -> Result<ImportReport> {
        let _guard = self.write_lock.lock().await;
        let result = self.import_markup_locked(markup).await;
        self.report("import_markup", result).await
    }

    async fn import_markup_locked(&self, markup: &str) -> Result<ImportReport> {
        let parsed = self
            .context
            .importer
            .parse_with(markup, &mut RandomIds, Utc::now());
        let stored = self.context.database.load_collection().await?;

        let (categories, remap, new_categories) = reconcile_categories(&stored.categories, parsed.categories);

        let incoming: Vec<Bookmark> = parsed
            .bookmarks
            .into_iter()
            .map(|mut bookmark| {
                if let Some(id) = remap.get(&bookmark.category) {
                    bookmark.category = id.clone();
                }
                bookmark
            })
            .collect();

        let outcome = merge(&stored.bookmarks, &incoming);
        let report = ImportReport {
            total: outcome.total(),
            added: outcome.added,
            duplicates: outcome.duplicates,
            new_categories,
        };

        let collection = ParsedBookmarks::new(categories, outcome.merged);
        self.context.database.save_collection(&collection).await?;

        info!(
            "Import finished: {} total, {} added, {} duplicates, {} new categories",
            report.total, report.added, report.duplicates, report.new_categories
        );
        Ok(report)
    }

    /// Read an export from disk and import it
    pub async fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<ImportReport> {
        let path = path.as_ref();
        info!("Importing bookmarks from {}", path.display());

        let read: Result<String> = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SystemError::from(e).into());
        let markup = self.report("import_file", read).await?;

        self.import_markup(&markup).await
    }

    /// Stored collection for read-only access
    pub async fn collection(&self) -> Result<ParsedBookmarks> {
        let result = self.context.database.load_collection().await;
        self.report("collection", result).await
    }

    /// Per-category counts and tag frequencies
    pub async fn get_stats(&self) -> Result<CollectionStats> {
        let collection = self.collection().await?;
        let counts = collection.count_by_category();

        let categories = collection
            .categories
            .iter()
            .map(|category| CategoryStat {
                id: category.id.clone(),
                name: category.name.clone(),
                count: counts.get(&category.id).copied().unwrap_or(0),
                icon: category.icon.clone(),
                color: category.color.clone(),
            })
            .collect();

        Ok(CollectionStats {
            total_bookmarks: collection.bookmarks.len(),
            uncategorized: collection.count_in_category(&CategoryId::uncategorized()),
            categories,
            tags: collection.tag_stats(),
        })
    }

    /// Export the stored collection as a snapshot document
    pub async fn export_snapshot(&self) -> Result<String> {
        let collection = self.collection().await?;
        let result = data_access::export_snapshot(&collection, Utc::now());
        self.report("export_snapshot", result).await
    }

    /// Replace the stored collection with a snapshot document
    ///
    /// The snapshot is validated as a whole first; a rejected snapshot
    /// leaves the stored collection untouched.
    pub async fn restore_snapshot(&self, json: &str) -> Result<ParsedBookmarks> {
        let _guard = self.write_lock.lock().await;

        let result = match data_access::import_snapshot(json) {
            Ok(collection) => self
                .context
                .database
                .save_collection(&collection)
                .await
                .map(|_| collection),
            Err(e) => Err(e),
        };
        self.report("restore_snapshot", result).await
    }
}

/// Fold parsed categories into the stored ones by name
///
/// Returns the combined category list, a map from parsed ids to the ids they
/// resolve to, and how many categories were new.
fn reconcile_categories(
    stored: &[Category],
    parsed: Vec<Category>,
) -> (Vec<Category>, HashMap<CategoryId, CategoryId>, usize) {
    let by_name: HashMap<&str, &CategoryId> = stored.iter().map(|c| (c.name.as_str(), &c.id)).collect();
    let mut next_order = stored.iter().map(|c| c.order + 1).max().unwrap_or(0);

    let mut combined = stored.to_vec();
    let mut remap = HashMap::with_capacity(parsed.len());
    let mut created = 0;

    for mut category in parsed {
        if let Some(existing) = by_name.get(category.name.as_str()) {
            remap.insert(category.id, (*existing).clone());
            continue;
        }

        // parents are listed before their children
        category.parent_id = category
            .parent_id
            .map(|parent| remap.get(&parent).cloned().unwrap_or(parent));
        category.order = next_order;
        next_order += 1;

        remap.insert(category.id.clone(), category.id.clone());
        combined.push(category);
        created += 1;
    }

    (combined, remap, created)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str, order: u32, parent: Option<&str>) -> Category {
        Category {
            id: CategoryId::from(id),
            name: name.to_string(),
            parent_id: parent.map(CategoryId::from),
            icon: "fa-folder".to_string(),
            color: "#6b7280".to_string(),
            order,
        }
    }

    #[tokio::test]
    async fn test_application_creation() {
        let app = Application::new(AppConfig::default()).await;
        assert!(app.is_ok());
    }

    #[tokio::test]
    async fn test_application_lifecycle() {
        let app = Application::new(AppConfig::default()).await.unwrap();
        assert!(app.shutdown().await.is_ok());
    }

    #[test]
    fn test_reconcile_reuses_stored_ids() {
        let stored = vec![category("s0", "开发", 0, None), category("s1", "工具", 3, None)];
        let parsed = vec![
            category("p0", "开发", 0, None),
            category("p1", "Rust", 1, Some("p0")),
            category("p2", "读看", 2, None),
        ];

        let (combined, remap, created) = reconcile_categories(&stored, parsed);

        assert_eq!(created, 2);
        assert_eq!(combined.len(), 4);
        assert_eq!(remap[&CategoryId::from("p0")], CategoryId::from("s0"));

        let rust = &combined[2];
        assert_eq!(rust.name, "Rust");
        assert_eq!(rust.order, 4);
        assert_eq!(rust.parent_id, Some(CategoryId::from("s0")));
        assert_eq!(combined[3].order, 5);
    }

    #[test]
    fn test_reconcile_into_empty_store() {
        let parsed = vec![category("p0", "A", 0, None), category("p1", "B", 1, None)];
        let (combined, _, created) = reconcile_categories(&[], parsed.clone());
        assert_eq!(created, 2);
        assert_eq!(combined, parsed);
    }
}
