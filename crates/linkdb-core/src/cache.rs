//! Cache invalidation
//!
//! Anything rendered from the link set (pages, feeds) goes stale when the
//! datastore is saved. The store calls its `CacheInvalidator` after every
//! successful save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while clearing a cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to clear cache entry '{path}': {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to list cache directory '{path}': {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Something that holds views derived from the link set
pub trait CacheInvalidator {
    /// Drop every derived view
    fn invalidate(&self) -> Result<(), CacheError>;
}

/// No derived views to drop
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl CacheInvalidator for NoCache {
    fn invalidate(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// A directory of rendered pages
///
/// Invalidation removes every regular file directly inside the directory.
/// Subdirectories are left alone and a missing directory is not an error.
#[derive(Debug, Clone)]
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CacheInvalidator for PageCache {
    fn invalidate(&self) -> Result<(), CacheError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(CacheError::List {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        for entry in entries {
            let path = entry
                .map_err(|source| CacheError::List {
                    path: self.dir.clone(),
                    source,
                })?
                .path();

            if path.is_file() {
                fs::remove_file(&path).map_err(|source| CacheError::Remove {
                    path: path.clone(),
                    source,
                })?;
            }
        }

        Ok(())
    }
}
