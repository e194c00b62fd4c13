// Properties of the import pipeline
//
// - canonicalization is idempotent
// - parse-time dedupe leaves pairwise distinct (url, lowercased title) keys
// - merge never drops or reorders existing bookmarks, and its counts add up
// - categories come out in first-encounter order with contiguous `order`
//
// Followed by the end-to-end import scenarios.

use bookmark_hub_core::{Bookmark, BookmarkId, CategoryId, Utc};
use bookmark_importer::*;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

// Strategy for query keys, mixing tracking and ordinary parameters
fn arb_query_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("utm_source".to_string()),
        Just("utm_medium".to_string()),
        Just("spm".to_string()),
        Just("from".to_string()),
        Just("share_token".to_string()),
        "[a-z]{1,6}",
    ]
}

// Query values that force the query to be re-serialized: escapes, `+`, `~`
// and non-ASCII text
fn arb_query_value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9]{0,6}",
        "([a-z0-9~+]|%20|%2B|%7E|%E4%B8%AD|é|中){1,5}",
    ]
}

fn arb_url_with_query() -> impl Strategy<Value = String> {
    (
        "https?://[a-z]{3,10}\\.(com|org|cn)",
        "(/[a-z0-9_-]{1,8}){0,3}",
        prop::collection::vec((arb_query_key(), arb_query_value()), 0..6),
    )
        .prop_map(|(origin, path, pairs)| {
            if pairs.is_empty() {
                format!("{}{}", origin, path)
            } else {
                let query: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                format!("{}{}?{}", origin, path, query.join("&"))
            }
        })
}

fn bookmark(index: usize, title: &str, url: &str) -> Bookmark {
    Bookmark {
        id: BookmarkId(format!("bookmark_{}", index)),
        title: title.to_string(),
        url: url.to_string(),
        category: CategoryId::uncategorized(),
        subcategory: None,
        tags: BTreeSet::new(),
        favicon: String::new(),
        description: None,
        created_at: Utc::now(),
        last_visited: None,
    }
}

// Small pools so that collisions actually happen
fn arb_bookmarks(max: usize) -> impl Strategy<Value = Vec<Bookmark>> {
    prop::collection::vec(
        (
            prop_oneof![Just("Site"), Just("site"), Just("SITE"), Just("Docs"), Just("Blog")],
            prop_oneof![
                Just("https://x.com/"),
                Just("https://y.com/"),
                Just("https://x.com/a"),
                Just("http://x.com/"),
            ],
        ),
        0..max,
    )
    .prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (title, url))| bookmark(i, title, url))
            .collect()
    })
}

// Folder headings with a random parent among earlier folders
fn arb_folder_specs() -> impl Strategy<Value = Vec<(String, Option<usize>)>> {
    prop::collection::vec(("[A-E][a-z]{0,2}", any::<prop::sample::Index>(), any::<bool>()), 0..15).prop_map(
        |raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (name, index, nested))| {
                    let parent = (nested && i > 0).then(|| index.index(i));
                    (name, parent)
                })
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_canonicalize_is_idempotent(url in arb_url_with_query()) {
        let once = canonicalize(&url);
        let twice = canonicalize(&once);
        prop_assert_eq!(&twice, &once);

        let canonicalizer = UrlCanonicalizer::new();
        if let Some(query) = url::Url::parse(&once).ok().and_then(|u| u.query().map(|q| q.to_string())) {
            for (key, _) in url::form_urlencoded::parse(query.as_bytes()) {
                prop_assert!(!canonicalizer.is_tracking_param(&key));
            }
        }
    }

    #[test]
    fn prop_dedupe_keys_are_distinct(bookmarks in arb_bookmarks(30)) {
        let output = dedupe(&bookmarks);

        let keys: HashSet<(String, String)> = output.iter().map(dedupe_key).collect();
        prop_assert_eq!(keys.len(), output.len());

        // nothing distinct is lost
        let input_keys: HashSet<(String, String)> = bookmarks.iter().map(dedupe_key).collect();
        prop_assert_eq!(&keys, &input_keys);

        // kept items are a subsequence of the input
        let mut cursor = bookmarks.iter();
        for kept in &output {
            prop_assert!(cursor.any(|b| b.id == kept.id));
        }
    }

    #[test]
    fn prop_merge_preserves_existing_and_counts(
        existing in arb_bookmarks(15),
        incoming in arb_bookmarks(15),
    ) {
        let outcome = merge(&existing, &incoming);

        prop_assert_eq!(outcome.added + outcome.duplicates, incoming.len());
        prop_assert_eq!(&outcome.merged[..existing.len()], &existing[..]);
        prop_assert_eq!(outcome.merged.len(), existing.len() + outcome.added);

        let known: HashSet<&str> = existing.iter().map(|b| b.url.as_str()).collect();
        for appended in &outcome.merged[existing.len()..] {
            prop_assert!(!known.contains(appended.url.as_str()));
        }
    }

    #[test]
    fn prop_category_order_follows_first_encounter(specs in arb_folder_specs()) {
        let mut tree = BookmarkTree::new();
        let mut ids = Vec::new();
        for (name, parent) in &specs {
            let parent = parent.map(|p| ids[p]);
            ids.push(tree.add_folder(name.clone(), parent));
        }

        let parsed = BookmarkImporter::new().parse_tree(&tree, &mut SequentialIds::new(), Utc::now());

        let mut seen = HashSet::new();
        let expected: Vec<&str> = specs
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| seen.insert(*name))
            .collect();
        let names: Vec<&str> = parsed.categories.iter().map(|c| c.name.as_str()).collect();
        prop_assert_eq!(names, expected);

        for (position, category) in parsed.categories.iter().enumerate() {
            prop_assert_eq!(category.order as usize, position);
            if let Some(parent) = &category.parent_id {
                prop_assert!(parsed.category(parent).map(|p| p.order < category.order).unwrap_or(false));
            }
        }
    }

    #[test]
    fn prop_parsed_markup_orders_top_level_folders(names in prop::collection::vec("[A-Z][a-z]{2,6}", 1..8)) {
        let mut markup = String::from("<DL><p>\n");
        for (i, name) in names.iter().enumerate() {
            markup.push_str(&format!(
                "<DT><H3>{}</H3>\n<DL><p>\n<DT><A HREF=\"https://site{}.example.com/\">Link {}</A>\n</DL><p>\n",
                name, i, i
            ));
        }
        markup.push_str("</DL><p>");

        let parsed = BookmarkImporter::new().parse(&markup);
        let orders: Vec<u32> = parsed.categories.iter().map(|c| c.order).collect();
        prop_assert!(orders.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(parsed.bookmarks.len(), names.len());
        for b in &parsed.bookmarks {
            prop_assert!(!b.is_uncategorized());
        }
    }
}

const HEADER: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n<TITLE>Bookmarks</TITLE>\n<H1>Bookmarks</H1>\n";

#[test]
fn scenario_a_tracking_param_and_category_order() {
    let markup = format!(
        "{}<DL><p>\n\
         <DT><H3 ADD_DATE=\"1700000000\">Tools</H3>\n\
         <DL><p>\n<DT><A HREF=\"https://a.com/?utm_source=x\">A</A>\n</DL><p>\n\
         <DT><H3>Docs</H3>\n<DL><p>\n</DL><p>\n\
         </DL><p>",
        HEADER
    );
    let parsed = BookmarkImporter::new().parse(&markup);

    assert_eq!(parsed.categories.len(), 2);
    assert_eq!(parsed.categories[0].name, "Tools");
    assert_eq!(parsed.categories[0].order, 0);
    assert_eq!(parsed.categories[1].name, "Docs");
    assert_eq!(parsed.categories[1].order, 1);

    assert_eq!(parsed.bookmarks.len(), 1);
    assert_eq!(parsed.bookmarks[0].url, "https://a.com/");
    assert_eq!(parsed.bookmarks[0].category, parsed.categories[0].id);
}

#[test]
fn scenario_b_duplicate_across_folders() {
    let markup = format!(
        "{}<DL><p>\n\
         <DT><H3>One</H3>\n<DL><p>\n<DT><A HREF=\"https://x.com/\">Site</A>\n</DL><p>\n\
         <DT><H3>Two</H3>\n<DL><p>\n<DT><A HREF=\"https://x.com/\">Site</A>\n</DL><p>\n\
         </DL><p>",
        HEADER
    );
    let parsed = BookmarkImporter::new().parse(&markup);

    let matching: Vec<_> = parsed.bookmarks.iter().filter(|b| b.url == "https://x.com/").collect();
    assert_eq!(matching.len(), 1);
}

#[test]
fn scenario_c_merge_dedup() {
    let existing = vec![bookmark(0, "X", "https://x.com/")];
    let incoming = vec![bookmark(1, "X", "https://x.com/"), bookmark(2, "Y", "https://y.com/")];

    let outcome = merge(&existing, &incoming);
    assert_eq!(outcome.merged.len(), 2);
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.duplicates, 1);
}

#[test]
fn scenario_d_script_links_are_skipped() {
    let markup = format!(
        "{}<DL><p>\n<DT><A HREF=\"javascript:void(0)\">Bookmarklet</A>\n</DL><p>",
        HEADER
    );
    let parsed = BookmarkImporter::new().parse(&markup);
    assert!(parsed.bookmarks.iter().all(|b| !b.url.starts_with("javascript:")));
    assert!(parsed.bookmarks.is_empty());
}

#[test]
fn scenario_e_tag_inference() {
    let markup = format!(
        "{}<DL><p>\n<DT><A HREF=\"https://github.com/\">GitHub 开发平台</A>\n</DL><p>",
        HEADER
    );
    let parsed = BookmarkImporter::new().parse(&markup);
    let github = &parsed.bookmarks[0];

    assert!(github.has_tag("开发"));
    assert!(!github.has_tag("设计"));
    assert!(github.is_uncategorized());
}
