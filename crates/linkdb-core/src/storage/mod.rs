//! Storage layer
//!
//! Handles the on-disk datastore file and the errors that come with it.
//!
//! The file is the only source of truth: it is read in full when a store
//! is opened and rewritten in full on every save.

pub mod error;
pub mod persistence;

pub use error::{StoreError, StoreResult};
pub use persistence::{seed_links, DatastoreFile};
