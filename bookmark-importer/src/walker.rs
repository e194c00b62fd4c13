//! Category resolution over a [`BookmarkTree`]
//!
//! Produces the distinct folder headings that become categories and, for
//! every admissible link, the category/subcategory names it belongs to.

use crate::canonicalize::is_importable_href;
use crate::tree::{BookmarkTree, FolderId};
use std::collections::HashSet;

/// A heading that becomes a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    pub name: String,
    /// Nearest enclosing non-structural heading
    pub parent: Option<String>,
}

/// Owning category names for one link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryResolution {
    /// `None` routes the link to the uncategorized sentinel
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

/// A link that passed admission, with its resolved names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub title: String,
    pub href: String,
    pub resolution: CategoryResolution,
}

/// Walker output for one tree
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// Distinct headings in first-encounter (pre-order) order
    pub headings: Vec<HeadingEntry>,
    pub candidates: Vec<LinkCandidate>,
    /// Links dropped for a missing/unsupported target or empty title
    pub skipped: usize,
}

/// Resolves categories for links in a bookmark tree
#[derive(Debug, Clone, Default)]
pub struct TreeWalker {
    excluded_headings: HashSet<String>,
}

impl TreeWalker {
    /// Create a walker treating the given headings as structural only
    pub fn new<I, S>(excluded_headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_headings: excluded_headings.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a heading is structural and never becomes a category
    pub fn is_structural(&self, tree: &BookmarkTree, heading: &str) -> bool {
        heading.is_empty()
            || self.excluded_headings.contains(heading)
            || tree.root_label() == Some(heading)
    }

    /// Walk the whole tree
    pub fn walk(&self, tree: &BookmarkTree) -> WalkOutput {
        let mut output = WalkOutput {
            headings: self.collect_headings(tree),
            ..WalkOutput::default()
        };

        for link in tree.links() {
            let href = match link.href.as_deref() {
                Some(href) if is_importable_href(href) => href,
                other => {
                    tracing::debug!("Skipping link {:?} with unsupported target {:?}", link.text, other);
                    output.skipped += 1;
                    continue;
                }
            };

            let title = link.text.trim();
            if title.is_empty() {
                tracing::debug!("Skipping untitled link {}", href);
                output.skipped += 1;
                continue;
            }

            output.candidates.push(LinkCandidate {
                title: title.to_string(),
                href: href.to_string(),
                resolution: self.resolve(tree, link.folder),
            });
        }

        output
    }

    /// Distinct category headings, first encounter wins
    fn collect_headings(&self, tree: &BookmarkTree) -> Vec<HeadingEntry> {
        let mut seen = HashSet::new();
        let mut headings = Vec::new();

        for (id, folder) in tree.folders() {
            if self.is_structural(tree, &folder.heading) || !seen.insert(folder.heading.as_str()) {
                continue;
            }

            let parent = tree
                .ancestors(id)
                .find(|(_, f)| !self.is_structural(tree, &f.heading))
                .map(|(_, f)| f.heading.clone());

            headings.push(HeadingEntry {
                name: folder.heading.clone(),
                parent,
            });
        }

        headings
    }

    /// Resolve the category of a link contained directly in `folder`
    ///
    /// The containing folder is the nearest heading. When that folder itself
    /// sits in a non-structural folder with a different heading, the link is
    /// one level deeper: the outer heading is the category and the nearer one
    /// the subcategory. Deeper ancestry is not distinguished further.
    pub fn resolve(&self, tree: &BookmarkTree, folder: Option<FolderId>) -> CategoryResolution {
        let Some(nearest) = folder.and_then(|id| tree.folder(id)) else {
            return CategoryResolution::default();
        };
        if nearest.heading.is_empty() {
            return CategoryResolution::default();
        }

        let outer = nearest.parent.and_then(|id| tree.folder(id));
        if let Some(outer) = outer {
            if !self.is_structural(tree, &outer.heading) && outer.heading != nearest.heading {
                return CategoryResolution {
                    category: Some(outer.heading.clone()),
                    subcategory: Some(nearest.heading.clone()),
                };
            }
        }

        CategoryResolution {
            category: Some(nearest.heading.clone()),
            subcategory: None,
        }
    }
}
