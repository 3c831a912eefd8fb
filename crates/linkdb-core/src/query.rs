//! Read-only queries over the visible link set
//!
//! Every query is a scan of the in-memory links; none of them touch the
//! datastore file. Results borrow from the store.

use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;

use crate::hash::small_hash;
use crate::models::{day_of, Link};
use crate::store::LinkStore;

/// A single filter a front end can route a request parameter to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFilter {
    /// Permalink token
    Hash(String),
    /// Required tags, space or comma separated
    Tags { expr: String, case_sensitive: bool },
    /// Case-insensitive substring search
    Text(String),
    /// `YYYYMMDD`
    Day(String),
    /// Every visible link
    All,
}

impl LinkStore {
    /// Apply `filter`, returning links in that filter's order
    pub fn filter(&self, filter: &LinkFilter) -> Vec<&Link> {
        match filter {
            LinkFilter::Hash(hash) => self.find_by_small_hash(hash).into_iter().collect(),
            LinkFilter::Tags {
                expr,
                case_sensitive,
            } => self.filter_tags(expr, *case_sensitive),
            LinkFilter::Text(query) => self.search(query),
            LinkFilter::Day(day) => self.filter_day(day),
            LinkFilter::All => self.iter().collect(),
        }
    }

    /// Full-text search, newest first
    ///
    /// The whole query is one pattern: a link matches when its title,
    /// description, url or tags contain it, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&Link> {
        let needle = query.to_lowercase();

        self.iter()
            .filter(|link| {
                [&link.title, &link.description, &link.url, &link.tags]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Links carrying every tag in `expr`, newest first
    ///
    /// `expr` is split on spaces and commas. Extra tags on a link don't
    /// matter; an empty expression matches every link.
    pub fn filter_tags(&self, expr: &str, case_sensitive: bool) -> Vec<&Link> {
        let fold = |tag: &str| {
            if case_sensitive {
                tag.to_string()
            } else {
                tag.to_lowercase()
            }
        };

        let required: BTreeSet<String> = expr
            .split([' ', ','])
            .filter(|t| !t.is_empty())
            .map(fold)
            .collect();

        self.iter()
            .filter(|link| {
                let tags: BTreeSet<String> = link.tag_list().map(fold).collect();
                required.is_subset(&tags)
            })
            .collect()
    }

    /// Links saved on `day` (`YYYYMMDD`), oldest first
    ///
    /// Anything other than eight ASCII digits matches nothing.
    pub fn filter_day(&self, day: &str) -> Vec<&Link> {
        if day.len() != 8 || !day.bytes().all(|b| b.is_ascii_digit()) {
            return Vec::new();
        }

        self.links
            .range::<str, _>((Bound::Included(day), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(day))
            .map(|(_, link)| link)
            .collect()
    }

    /// The link whose permalink token is `hash`
    pub fn find_by_small_hash(&self, hash: &str) -> Option<&Link> {
        self.iter().find(|link| small_hash(&link.linkdate) == hash)
    }

    /// Every tag with its number of occurrences, most used first
    ///
    /// Equal counts keep the order in which tags are first met while
    /// scanning newest first.
    pub fn all_tags(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

        for tag in self.iter().flat_map(Link::tag_list) {
            let first_seen = counts.len();
            counts.entry(tag).or_insert((0, first_seen)).0 += 1;
        }

        let mut tags: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
        tags.sort_by(|(_, (count_a, seen_a)), (_, (count_b, seen_b))| {
            count_b.cmp(count_a).then(seen_a.cmp(seen_b))
        });

        tags.into_iter()
            .map(|(tag, (count, _))| (tag.to_string(), count))
            .collect()
    }

    /// Distinct `YYYYMMDD` days that have links, oldest first
    pub fn all_days(&self) -> Vec<String> {
        self.links
            .keys()
            .filter_map(|key| day_of(key))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NoCache;
    use crate::store::Access;
    use tempfile::TempDir;

    /// A logged-in store holding only `links`
    fn store_with(temp_dir: &TempDir, links: &[(&str, &str, &str, bool)]) -> LinkStore {
        let path = temp_dir.path().join("datastore.txt");
        let mut store = LinkStore::open(&path, Access::logged_in(), NoCache).unwrap();

        let seeded: Vec<String> = store.keys().map(str::to_string).collect();
        for key in seeded {
            store.delete(&key).unwrap();
        }

        for (key, url, tags, private) in links {
            let mut link = Link::with_linkdate(*key, *url);
            link.set_tags(*tags);
            link.set_private(*private);
            store.set(key, link).unwrap();
        }
        store
    }

    fn keys<'a>(links: &[&'a Link]) -> Vec<&'a str> {
        links.iter().map(|l| l.linkdate.as_str()).collect()
    }

    #[test]
    fn test_search_matches_any_field_ignoring_case() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store_with(
            &temp_dir,
            &[
                ("20120101_100000", "https://rust-lang.org", "lang", false),
                ("20120102_100000", "https://python.org", "lang", false),
                ("20120103_100000", "https://example.com", "ÉTÉ", false),
            ],
        );
        let mut described = store.get("20120102_100000").unwrap().clone();
        described.set_description("Not as fast as Rust");
        store.set("20120102_100000", described).unwrap();

        assert_eq!(
            keys(&store.search("RUST")),
            vec!["20120102_100000", "20120101_100000"]
        );
        assert_eq!(keys(&store.search("été")), vec!["20120103_100000"]);
        assert!(store.search("golang").is_empty());
    }

    #[test]
    fn test_search_is_one_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store_with(&temp_dir, &[("20120101_100000", "https://a.com", "", false)]);
        let mut link = store.get("20120101_100000").unwrap().clone();
        link.set_title("hello big world");
        store.set("20120101_100000", link).unwrap();

        assert!(store.search("hello world").is_empty());
        assert_eq!(store.search("big world").len(), 1);
        assert_eq!(store.search("").len(), 1);
    }

    #[test]
    fn test_filter_tags_subset() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(
            &temp_dir,
            &[
                ("20120101_100000", "https://a.com", "a b c", false),
                ("20120102_100000", "https://b.com", "b a", false),
                ("20120103_100000", "https://c.com", "a", false),
                ("20120104_100000", "https://d.com", "ab", false),
            ],
        );

        assert_eq!(
            keys(&store.filter_tags("a b", false)),
            vec!["20120102_100000", "20120101_100000"]
        );
        assert_eq!(
            keys(&store.filter_tags("b,a", false)),
            keys(&store.filter_tags("a b", false))
        );
        assert_eq!(store.filter_tags("a", false).len(), 3);
        assert!(store.filter_tags("a d", false).is_empty());
        assert_eq!(store.filter_tags("", false).len(), 4);
    }

    #[test]
    fn test_filter_tags_case() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(&temp_dir, &[("20120101_100000", "https://a.com", "Rust Web", false)]);

        assert_eq!(store.filter_tags("rust WEB", false).len(), 1);
        assert!(store.filter_tags("rust", true).is_empty());
        assert_eq!(store.filter_tags("Rust", true).len(), 1);
    }

    #[test]
    fn test_filter_day_ascending() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(
            &temp_dir,
            &[
                ("20120101_235959", "https://c.com", "", false),
                ("20120101_000000", "https://a.com", "", false),
                ("20120101_120000", "https://b.com", "", false),
                ("20120102_000000", "https://d.com", "", false),
                ("20111231_235959", "https://e.com", "", false),
            ],
        );

        assert_eq!(
            keys(&store.filter_day("20120101")),
            vec!["20120101_000000", "20120101_120000", "20120101_235959"]
        );
        assert!(store.filter_day("20120103").is_empty());
        assert!(store.filter_day("2012").is_empty());
        assert!(store.filter_day("2012010a").is_empty());
    }

    #[test]
    fn test_find_by_small_hash() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(
            &temp_dir,
            &[
                ("20120101_100000", "https://a.com", "", false),
                ("20120102_100000", "https://b.com", "", false),
            ],
        );

        let hash = small_hash("20120101_100000");
        assert_eq!(
            store.find_by_small_hash(&hash).unwrap().linkdate,
            "20120101_100000"
        );
        assert_eq!(store.get("20120102_100000").unwrap().small_hash(), small_hash("20120102_100000"));
        assert!(store.find_by_small_hash("nope00").is_none());
    }

    #[test]
    fn test_all_tags_counts_and_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(
            &temp_dir,
            &[
                ("20120101_100000", "https://a.com", "web rust", false),
                ("20120102_100000", "https://b.com", "rust", false),
                ("20120103_100000", "https://c.com", "zeta alpha", false),
            ],
        );

        // newest first: zeta, alpha, rust, web
        assert_eq!(
            store.all_tags(),
            vec![
                ("rust".to_string(), 2),
                ("zeta".to_string(), 1),
                ("alpha".to_string(), 1),
                ("web".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_all_days() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(
            &temp_dir,
            &[
                ("20120102_100000", "https://a.com", "", false),
                ("20120101_100000", "https://b.com", "", false),
                ("20120101_110000", "https://c.com", "", false),
            ],
        );

        assert_eq!(store.all_days(), vec!["20120101", "20120102"]);
    }

    #[test]
    fn test_filter_dispatch() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with(
            &temp_dir,
            &[
                ("20120101_100000", "https://a.com", "x y", false),
                ("20120102_100000", "https://b.com", "x", false),
            ],
        );

        assert_eq!(store.filter(&LinkFilter::All).len(), 2);
        assert_eq!(
            keys(&store.filter(&LinkFilter::Tags {
                expr: "y".to_string(),
                case_sensitive: false
            })),
            vec!["20120101_100000"]
        );
        assert_eq!(store.filter(&LinkFilter::Text("b.com".to_string())).len(), 1);
        assert_eq!(store.filter(&LinkFilter::Day("20120102".to_string())).len(), 1);
        assert_eq!(
            store
                .filter(&LinkFilter::Hash(small_hash("20120102_100000")))
                .len(),
            1
        );
    }
}
