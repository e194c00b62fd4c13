//! Bookmark importer
//!
//! Turns a browser bookmark export (Netscape `<DL>`/`<DT>` markup) into a flat,
//! deduplicated collection of categories and bookmarks.
//!
//! # Pipeline
//! - [`tree`]: markup lowered into an explicit folder/link tree
//! - [`walker`]: category headings and per-link category resolution
//! - [`canonicalize`]: tracking parameters stripped from URLs
//! - [`classifier`]: icon, color and tag inference from lookup tables
//! - [`dedupe`]: same URL and case-insensitive title collapse to one
//! - [`importer`]: orchestration plus `merge` into an existing collection
//!
//! Nothing here fails on malformed input. Unusable links are skipped and
//! links without an owning folder land in the uncategorized sentinel.

pub mod canonicalize;
pub mod classifier;
pub mod dedupe;
pub mod importer;
pub mod tree;
pub mod walker;

pub use canonicalize::{canonicalize, domain_of, is_importable_href, UrlCanonicalizer, DEFAULT_TRACKING_PARAMS};
pub use classifier::{ClassifierConfig, HeuristicClassifier, TagRule};
pub use dedupe::{dedupe, dedupe_in_place, dedupe_key};
pub use importer::{merge, BookmarkImporter, IdSource, ImportConfig, MergeOutcome, RandomIds, SequentialIds};
pub use tree::{BookmarkTree, FolderId, FolderNode, LinkNode};
pub use walker::{CategoryResolution, HeadingEntry, LinkCandidate, TreeWalker, WalkOutput};
