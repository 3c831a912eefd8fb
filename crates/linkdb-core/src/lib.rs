//! linkdb Core Library
//!
//! A single-file, in-process datastore for bookmarks ("links").
//!
//! # Architecture
//!
//! - **Datastore file**: the only source of truth, read in full on open
//!   and rewritten in full on save
//! - **In-memory link set**: keyed by `linkdate`, with a URL index
//!
//! All queries are served directly from memory.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = LinkStore::open_with_config(&config, true)?;
//!
//! // Add a link
//! let mut link = Link::new("https://example.com");
//! link.set_title("Example");
//! store.set(&link.linkdate.clone(), link)?;
//! store.save()?;
//!
//! // Query links
//! let tagged = store.filter_tags("rust web", false);
//! ```
//!
//! # Modules
//!
//! - `store`: the link store (main entry point)
//! - `query`: search and filters over the link set
//! - `models`: the `Link` record
//! - `codec`: datastore blob encoding
//! - `storage`: datastore file persistence and errors
//! - `sanitize`: markup escaping applied on load
//! - `hash`: permalink tokens
//! - `cache`: cache invalidation after save
//! - `config`: application configuration

pub mod cache;
pub mod codec;
pub mod config;
pub mod hash;
pub mod models;
pub mod query;
pub mod sanitize;
pub mod storage;
pub mod store;

pub use cache::{CacheError, CacheInvalidator, NoCache, PageCache};
pub use codec::CodecError;
pub use config::Config;
pub use hash::small_hash;
pub use models::Link;
pub use query::LinkFilter;
pub use storage::{DatastoreFile, StoreError, StoreResult};
pub use store::{Access, LinkStore};
