//! The link store
//!
//! `LinkStore` owns the in-memory link set, loaded once from the datastore
//! file, and keeps a URL → key index alongside it.
//!
//! ## Visibility
//!
//! Visibility is decided once, at open time, from the caller's `Access`:
//! - logged in: every link is loaded
//! - anonymous: private links are dropped
//! - anonymous with `hide_public_links`: nothing is loaded
//!
//! Mutations (`set`, `delete`, `save`) require a logged-in session.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = LinkStore::open(path, Access::logged_in(), NoCache)?;
//!
//! let mut link = Link::new("https://example.com");
//! link.set_tags("web example");
//! store.set(&link.linkdate.clone(), link)?;
//! store.save()?;
//!
//! for link in store.iter() {
//!     println!("{} {}", link.linkdate, link.url);
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::cache::{CacheInvalidator, PageCache};
use crate::config::Config;
use crate::models::Link;
use crate::sanitize::sanitize_link;
use crate::storage::{DatastoreFile, StoreError, StoreResult};

/// What the current session is allowed to see and do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Access {
    /// The session may see private links and modify the store
    pub logged_in: bool,
    /// Anonymous sessions see no links at all
    pub hide_public_links: bool,
}

impl Access {
    /// A logged-in session
    pub fn logged_in() -> Self {
        Self {
            logged_in: true,
            hide_public_links: false,
        }
    }

    /// An anonymous session that sees public links
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build from the session flag and configuration
    pub fn new(logged_in: bool, config: &Config) -> Self {
        Self {
            logged_in,
            hide_public_links: config.hide_public_links,
        }
    }
}

/// Bookmark store backed by a single datastore file
pub struct LinkStore {
    /// Visible links by key
    pub(crate) links: BTreeMap<String, Link>,
    /// url → key
    url_index: HashMap<String, String>,
    access: Access,
    file: DatastoreFile,
    invalidator: Box<dyn CacheInvalidator>,
}

impl LinkStore {
    /// Open the store at `path`
    ///
    /// A missing datastore is seeded with two example links. A datastore
    /// that exists but cannot be decoded is `StoreError::CorruptDatastore`.
    pub fn open(
        path: impl Into<PathBuf>,
        access: Access,
        invalidator: impl CacheInvalidator + 'static,
    ) -> StoreResult<Self> {
        let file = DatastoreFile::new(path);
        let mut links = file.load_or_seed()?;
        let total = links.len();

        if access.hide_public_links && !access.logged_in {
            links.clear();
        } else {
            if !access.logged_in {
                links.retain(|_, link| !link.private);
            }
            links.values_mut().for_each(sanitize_link);
        }

        debug!(
            "Loaded {} of {} links (logged_in={})",
            links.len(),
            total,
            access.logged_in
        );

        let url_index = build_url_index(&links);

        Ok(Self {
            links,
            url_index,
            access,
            file,
            invalidator: Box::new(invalidator),
        })
    }

    /// Open the store described by `config`, invalidating its page cache on save
    pub fn open_with_config(config: &Config, logged_in: bool) -> StoreResult<Self> {
        Self::open(
            config.datastore_path(),
            Access::new(logged_in, config),
            PageCache::new(config.page_cache_dir()),
        )
    }

    /// The access this store was opened with
    pub fn access(&self) -> Access {
        self.access
    }

    /// The datastore file this store reads and writes
    pub fn file(&self) -> &DatastoreFile {
        &self.file
    }

    // ==================== Associative Access ====================

    /// Get a link by key
    pub fn get(&self, key: &str) -> Option<&Link> {
        self.links.get(key)
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.links.contains_key(key)
    }

    /// Number of visible links
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if no links are visible
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Get a link by URL
    pub fn find_by_url(&self, url: &str) -> Option<&Link> {
        self.url_index.get(url).and_then(|key| self.links.get(key))
    }

    /// Insert or replace the link stored under `key`
    ///
    /// `key` must equal `link.linkdate`. If the link previously had a
    /// different URL, that URL's index entry is dropped. If another link
    /// already claims `link.url`, the index now points here.
    pub fn set(&mut self, key: &str, link: Link) -> StoreResult<()> {
        self.require_login("modify links")?;
        validate(key, &link)?;

        if let Some(previous) = self.links.get(key) {
            if previous.url != link.url && self.indexed_key(&previous.url) == Some(key) {
                self.url_index.remove(&previous.url);
            }
        }

        self.url_index.insert(link.url.clone(), key.to_string());
        self.links.insert(key.to_string(), link);
        Ok(())
    }

    /// Remove the link stored under `key`
    ///
    /// Removing an absent key is a no-op.
    pub fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.require_login("delete links")?;

        if let Some(link) = self.links.remove(key) {
            if self.indexed_key(&link.url) == Some(key) {
                self.url_index.remove(&link.url);
            }
        }
        Ok(())
    }

    // ==================== Iteration ====================

    /// Iterate over links, newest first
    ///
    /// The iterator borrows the store, so links cannot change while it
    /// is in use. Each call starts a fresh pass.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Link> + ExactSizeIterator + '_ {
        self.links.values().rev()
    }

    /// Keys, newest first
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.links.keys().rev().map(String::as_str)
    }

    // ==================== Persistence ====================

    /// Write the full link set back to the datastore
    ///
    /// Derived caches are invalidated after a successful write. A failed
    /// invalidation is logged; the save itself has already succeeded.
    pub fn save(&self) -> StoreResult<()> {
        self.require_login("save the datastore")?;

        self.file.save(&self.links)?;
        info!("Saved {} links to {:?}", self.links.len(), self.file.path());

        if let Err(e) = self.invalidator.invalidate() {
            warn!("Cache invalidation failed: {}", e);
        }
        Ok(())
    }

    fn indexed_key(&self, url: &str) -> Option<&str> {
        self.url_index.get(url).map(String::as_str)
    }

    fn require_login(&self, operation: &'static str) -> StoreResult<()> {
        if self.access.logged_in {
            Ok(())
        } else {
            Err(StoreError::Unauthorized { operation })
        }
    }
}

impl<'a> IntoIterator for &'a LinkStore {
    type Item = &'a Link;
    type IntoIter = std::iter::Rev<std::collections::btree_map::Values<'a, String, Link>>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.values().rev()
    }
}

fn validate(key: &str, link: &Link) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::Validation("key must not be empty".to_string()));
    }
    if link.linkdate.is_empty() {
        return Err(StoreError::Validation("linkdate must not be empty".to_string()));
    }
    if link.url.is_empty() {
        return Err(StoreError::Validation("url must not be empty".to_string()));
    }
    if key != link.linkdate {
        return Err(StoreError::Validation(format!(
            "key '{}' does not match linkdate '{}'",
            key, link.linkdate
        )));
    }
    Ok(())
}

fn build_url_index(links: &BTreeMap<String, Link>) -> HashMap<String, String> {
    links
        .iter()
        .map(|(key, link)| (link.url.clone(), key.clone()))
        .collect()
}
