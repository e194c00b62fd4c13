//! Import orchestration
//!
//! `BookmarkImporter::parse` runs the whole pipeline over one export:
//! tree lowering, category resolution, URL canonicalization, classification
//! and deduplication. `merge` folds a parsed batch into an existing
//! collection by URL.

use crate::canonicalize::{domain_of, UrlCanonicalizer, DEFAULT_TRACKING_PARAMS};
use crate::classifier::{ClassifierConfig, HeuristicClassifier};
use crate::dedupe::dedupe_in_place;
use crate::tree::BookmarkTree;
use crate::walker::{TreeWalker, WalkOutput};
use bookmark_hub_core::*;
use std::collections::{HashMap, HashSet};

/// Importer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Headings that group links but never become categories
    pub excluded_headings: Vec<String>,
    pub title_max_chars: usize,
    pub tracking_params: Vec<String>,
    /// Favicon URL with a `{domain}` placeholder
    pub favicon_template: String,
    /// Favicon used when the URL has no host
    pub favicon_fallback: String,
    pub classifier: ClassifierConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            excluded_headings: vec!["书签栏".to_string(), "API key".to_string()],
            title_max_chars: 100,
            tracking_params: DEFAULT_TRACKING_PARAMS.iter().map(|p| p.to_string()).collect(),
            favicon_template: "https://www.google.com/s2/favicons?domain={domain}&sz=64".to_string(),
            favicon_fallback: "https://via.placeholder.com/64?text=WEB".to_string(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Source of ids for one import call
pub trait IdSource {
    fn category_id(&mut self) -> CategoryId;
    fn bookmark_id(&mut self) -> BookmarkId;
}

/// Counter-based ids local to one call
///
/// Categories and bookmarks draw from the same counter, so the same input
/// always produces the same ids.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u64 {
        let current = self.next;
        self.next += 1;
        current
    }
}

impl IdSource for SequentialIds {
    fn category_id(&mut self) -> CategoryId {
        CategoryId(format!("category_{}", self.bump()))
    }

    fn bookmark_id(&mut self) -> BookmarkId {
        BookmarkId(format!("bookmark_{}", self.bump()))
    }
}

/// Random UUID ids, for records that join a long-lived collection
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn category_id(&mut self) -> CategoryId {
        CategoryId::new()
    }

    fn bookmark_id(&mut self) -> BookmarkId {
        BookmarkId::new()
    }
}

/// Result of merging an incoming batch into an existing collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: Vec<Bookmark>,
    pub added: usize,
    pub duplicates: usize,
}

impl MergeOutcome {
    /// Size of the incoming batch
    pub fn total(&self) -> usize {
        self.added + self.duplicates
    }
}

/// Append the incoming bookmarks whose URL is not already present
///
/// Only `existing` is consulted; entries of `existing` are never changed or
/// reordered.
pub fn merge(existing: &[Bookmark], incoming: &[Bookmark]) -> MergeOutcome {
    let known: HashSet<&str> = existing.iter().map(|b| b.url.as_str()).collect();

    let fresh: Vec<Bookmark> = incoming
        .iter()
        .filter(|b| !known.contains(b.url.as_str()))
        .cloned()
        .collect();

    let added = fresh.len();
    let duplicates = incoming.len() - added;

    let mut merged = Vec::with_capacity(existing.len() + added);
    merged.extend_from_slice(existing);
    merged.extend(fresh);

    tracing::info!(
        "Merged {} incoming bookmarks: {} added, {} duplicates",
        incoming.len(),
        added,
        duplicates
    );

    MergeOutcome {
        merged,
        added,
        duplicates,
    }
}

/// Bookmark export importer
#[derive(Debug, Clone)]
pub struct BookmarkImporter {
    config: ImportConfig,
    canonicalizer: UrlCanonicalizer,
    classifier: HeuristicClassifier,
    walker: TreeWalker,
}

impl BookmarkImporter {
    /// Create an importer with default settings
    pub fn new() -> Self {
        Self::with_config(ImportConfig::default())
    }

    /// Create an importer with custom settings
    pub fn with_config(config: ImportConfig) -> Self {
        Self {
            canonicalizer: UrlCanonicalizer::with_params(config.tracking_params.iter().cloned()),
            classifier: HeuristicClassifier::with_config(config.classifier.clone()),
            walker: TreeWalker::new(config.excluded_headings.iter().cloned()),
            config,
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn canonicalizer(&self) -> &UrlCanonicalizer {
        &self.canonicalizer
    }

    pub fn classifier(&self) -> &HeuristicClassifier {
        &self.classifier
    }

    /// Parse an export with per-call sequential ids stamped with the current time
    pub fn parse(&self, markup: &str) -> ParsedBookmarks {
        self.parse_with(markup, &mut SequentialIds::new(), Utc::now())
    }

    /// Parse an export with explicit ids and import time
    pub fn parse_with(
        &self,
        markup: &str,
        ids: &mut dyn IdSource,
        imported_at: DateTime<Utc>,
    ) -> ParsedBookmarks {
        let tree = BookmarkTree::parse(markup);
        self.parse_tree(&tree, ids, imported_at)
    }

    /// Build categories and bookmarks from an already lowered tree
    pub fn parse_tree(
        &self,
        tree: &BookmarkTree,
        ids: &mut dyn IdSource,
        imported_at: DateTime<Utc>,
    ) -> ParsedBookmarks {
        let WalkOutput {
            headings,
            candidates,
            skipped,
        } = self.walker.walk(tree);

        let mut by_name: HashMap<String, CategoryId> = HashMap::with_capacity(headings.len());
        let mut categories = Vec::with_capacity(headings.len());

        for (order, heading) in headings.into_iter().enumerate() {
            let id = ids.category_id();
            // ancestors precede descendants in pre-order
            let parent_id = heading.parent.as_ref().and_then(|p| by_name.get(p)).cloned();
            by_name.insert(heading.name.clone(), id.clone());

            categories.push(Category {
                id,
                icon: self.classifier.icon_for(&heading.name).to_string(),
                color: self.classifier.color_for(&heading.name).to_string(),
                name: heading.name,
                parent_id,
                order: order as u32,
            });
        }

        let mut bookmarks = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let title = self.clean_title(&candidate.title);
            let url = self.canonicalizer.canonicalize(&candidate.href);
            let category = candidate
                .resolution
                .category
                .as_ref()
                .and_then(|name| by_name.get(name))
                .cloned()
                .unwrap_or_else(CategoryId::uncategorized);

            bookmarks.push(Bookmark {
                id: ids.bookmark_id(),
                tags: self.classifier.tags_for(&candidate.title, &candidate.href),
                favicon: self.favicon_for(&url),
                title,
                url,
                category,
                subcategory: candidate.resolution.subcategory,
                description: None,
                created_at: imported_at,
                last_visited: None,
            });
        }

        let dropped = dedupe_in_place(&mut bookmarks);

        tracing::info!(
            "Parsed {} categories and {} bookmarks ({} skipped, {} duplicates)",
            categories.len(),
            bookmarks.len(),
            skipped,
            dropped
        );

        ParsedBookmarks::new(categories, bookmarks)
    }

    /// Trim, collapse inner whitespace and bound the length of a title
    pub fn clean_title(&self, raw: &str) -> String {
        raw.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(self.config.title_max_chars)
            .collect()
    }

    /// Favicon URL for a bookmark URL
    pub fn favicon_for(&self, url: &str) -> String {
        match domain_of(url) {
            Some(domain) => self.config.favicon_template.replace("{domain}", &domain),
            None => self.config.favicon_fallback.clone(),
        }
    }
}

impl Default for BookmarkImporter {
    fn default() -> Self {
        Self::new()
    }
}
