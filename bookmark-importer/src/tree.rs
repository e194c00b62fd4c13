//! Explicit folder/link tree for bookmark exports
//!
//! Netscape-style exports nest `<DT><H3>` headings and `<DT><A>` links inside
//! `<DL>` lists. The markup is parsed with `scraper` and lowered into a small
//! arena: folders are stored in pre-order with a back-reference to their
//! parent folder, and every link holds a non-owning reference to the folder
//! that directly contains it.

use scraper::{ElementRef, Html, Selector};

/// Index of a folder inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(usize);

impl FolderId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A folder heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub heading: String,
    pub parent: Option<FolderId>,
}

/// A link as found in the export, before any filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkNode {
    pub href: Option<String>,
    pub text: String,
    /// Folder whose list directly contains the link
    pub folder: Option<FolderId>,
}

/// Folder/link tree in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkTree {
    root_label: Option<String>,
    folders: Vec<FolderNode>,
    links: Vec<LinkNode>,
}

impl BookmarkTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree whose root carries a label
    pub fn with_root_label(label: impl Into<String>) -> Self {
        Self {
            root_label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Parse bookmark export markup
    ///
    /// Tolerant of missing timestamps, empty folders and the two common DOM
    /// shapes: the `<DL>` of a folder either nested in its `<DT>` or following
    /// it as a sibling.
    pub fn parse(markup: &str) -> Self {
        let document = Html::parse_document(markup);
        let mut tree = Self {
            root_label: Self::find_root_label(&document),
            ..Self::default()
        };

        tree.lower(document.root_element());

        tracing::debug!(
            "Parsed bookmark tree: {} folders, {} links",
            tree.folders.len(),
            tree.links.len()
        );
        tree
    }

    fn find_root_label(document: &Html) -> Option<String> {
        ["h1", "title"].iter().find_map(|name| {
            let selector = Selector::parse(name).ok()?;
            let element = document.select(&selector).next()?;
            let text = element_text(element);
            (!text.is_empty()).then_some(text)
        })
    }

    /// Lower the element tree in document order, attaching headings and links
    /// to the folder that owns them.
    ///
    /// Each `<DL>` opens a new level with its own pending slot: the most
    /// recent heading at that level that has not yet claimed a list. The next
    /// `<DL>` at this level or below becomes its contents. The walk uses an
    /// explicit stack so nesting depth is bounded only by memory.
    fn lower(&mut self, root: ElementRef<'_>) {
        let mut pending: Vec<Option<FolderId>> = vec![None];
        let mut stack = vec![LowerStep {
            element: root,
            folder: None,
            level: 0,
        }];

        while let Some(LowerStep { element, folder, level }) = stack.pop() {
            match element.value().name() {
                "h3" => {
                    let heading = element_text(element);
                    pending[level] = Some(self.add_folder(heading, folder));
                }
                "dl" => {
                    let owner = pending[level].take().or(folder);
                    pending.push(None);
                    push_children(&mut stack, element, owner, pending.len() - 1);
                }
                "a" => {
                    let href = element.value().attr("href").map(|h| h.trim().to_string());
                    self.add_link(href, element_text(element), folder);
                }
                "dt" => {
                    pending[level] = None;
                    push_children(&mut stack, element, folder, level);
                }
                "head" | "h1" | "script" | "style" => {}
                _ => push_children(&mut stack, element, folder, level),
            }
        }
    }

    /// Add a folder under `parent` (or at the top level)
    pub fn add_folder(&mut self, heading: impl Into<String>, parent: Option<FolderId>) -> FolderId {
        let parent = parent.filter(|p| p.0 < self.folders.len());
        let id = FolderId(self.folders.len());
        self.folders.push(FolderNode {
            heading: heading.into(),
            parent,
        });
        id
    }

    /// Add a link directly inside `folder` (or at the top level)
    pub fn add_link(&mut self, href: Option<String>, text: impl Into<String>, folder: Option<FolderId>) {
        let folder = folder.filter(|f| f.0 < self.folders.len());
        self.links.push(LinkNode {
            href,
            text: text.into(),
            folder,
        });
    }

    pub fn root_label(&self) -> Option<&str> {
        self.root_label.as_deref()
    }

    pub fn folder(&self, id: FolderId) -> Option<&FolderNode> {
        self.folders.get(id.0)
    }

    /// Folders in pre-order (first-encounter order)
    pub fn folders(&self) -> impl Iterator<Item = (FolderId, &FolderNode)> {
        self.folders
            .iter()
            .enumerate()
            .map(|(index, node)| (FolderId(index), node))
    }

    /// Links in document order
    pub fn links(&self) -> &[LinkNode] {
        &self.links
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Parent chain of a folder, nearest first, excluding the folder itself
    pub fn ancestors(&self, id: FolderId) -> impl Iterator<Item = (FolderId, &FolderNode)> {
        let mut current = self.folder(id).and_then(|f| f.parent);
        std::iter::from_fn(move || {
            let id = current?;
            let node = self.folder(id)?;
            current = node.parent;
            Some((id, node))
        })
    }

    /// Number of folders above `id`
    pub fn depth(&self, id: FolderId) -> usize {
        self.ancestors(id).count()
    }
}

/// One element waiting to be lowered
struct LowerStep<'a> {
    element: ElementRef<'a>,
    /// Folder that owns headings and links found here
    folder: Option<FolderId>,
    /// Index of the pending-heading slot for this list level
    level: usize,
}

/// Queue the element children of `element` so they pop in document order
fn push_children<'a>(stack: &mut Vec<LowerStep<'a>>, element: ElementRef<'a>, folder: Option<FolderId>, level: usize) {
    let children: Vec<ElementRef<'a>> = element.children().filter_map(ElementRef::wrap).collect();
    stack.extend(children.into_iter().rev().map(|element| LowerStep { element, folder, level }));
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
