//! Datastore file persistence
//!
//! Reads and writes the single datastore file. Writes are atomic (write to
//! a temp file, sync, then rename) so a crash mid-save leaves the previous
//! datastore intact.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codec;
use crate::models::Link;
use crate::storage::error::{StoreError, StoreResult};

/// Persistence handler for one datastore file
#[derive(Debug, Clone)]
pub struct DatastoreFile {
    path: PathBuf,
}

impl DatastoreFile {
    /// Create a handler for the datastore at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the datastore file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the datastore exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Encode and atomically write the full link set
    pub fn save(&self, links: &BTreeMap<String, Link>) -> StoreResult<()> {
        let blob = codec::encode(links)?;
        atomic_write(&self.path, blob.as_bytes())?;
        debug!("Wrote {} links to {:?}", links.len(), self.path);
        Ok(())
    }

    /// Read and decode the datastore
    ///
    /// Returns `None` if the file doesn't exist. A file that exists but
    /// cannot be decoded is `StoreError::CorruptDatastore`.
    pub fn load(&self) -> StoreResult<Option<BTreeMap<String, Link>>> {
        let blob = match fs::read_to_string(&self.path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(StoreError::CorruptDatastore {
                    path: self.path.clone(),
                    details: "datastore is not valid UTF-8".to_string(),
                })
            }
            Err(source) => {
                return Err(StoreError::ReadError {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let links = codec::decode(&blob).map_err(|e| StoreError::CorruptDatastore {
            path: self.path.clone(),
            details: e.to_string(),
        })?;

        debug!("Read {} links from {:?}", links.len(), self.path);
        Ok(Some(links))
    }

    /// Load the datastore, writing the seed links first if it doesn't exist
    pub fn load_or_seed(&self) -> StoreResult<BTreeMap<String, Link>> {
        if let Some(links) = self.load()? {
            return Ok(links);
        }

        let links = seed_links();
        self.save(&links)?;
        info!("Created new datastore at {:?}", self.path);
        Ok(links)
    }
}

/// The two example links a new datastore starts with
pub fn seed_links() -> BTreeMap<String, Link> {
    let mut public = Link::with_linkdate("20110914_190000", "https://github.com/linkdb/linkdb");
    public.set_title("linkdb - single-file bookmark datastore");
    public.set_description(
        "Welcome to linkdb! This is a public link. Edit or delete it once you have added your own.",
    );
    public.set_tags("opensource software");

    let mut private = Link::with_linkdate("20110914_190001", "https://www.rust-lang.org/");
    private.set_title("Rust programming language");
    private.set_description(
        "This is a private link: only visible while logged in. Edit or delete it.",
    );
    private.set_tags("secretstuff");
    private.set_private(true);

    [public, private]
        .into_iter()
        .map(|link| (link.linkdate.clone(), link))
        .collect()
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let temp_path = temp_path_for(path);

    let mut file =
        File::create(&temp_path).map_err(|e| StoreError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StoreError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| StoreError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Sibling of `path` with `.tmp` appended to the whole file name
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = DatastoreFile::new(temp_dir.path().join("datastore.txt"));

        assert!(!file.exists());
        assert!(file.load().unwrap().is_none());

        let mut links = BTreeMap::new();
        let mut link = Link::with_linkdate("20120101_100000", "https://example.com");
        link.set_title("Example");
        links.insert(link.linkdate.clone(), link);

        file.save(&links).unwrap();
        assert!(file.exists());

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded, links);
    }

    #[test]
    fn test_load_or_seed_creates_seed() {
        let temp_dir = TempDir::new().unwrap();
        let file = DatastoreFile::new(temp_dir.path().join("datastore.txt"));

        let links = file.load_or_seed().unwrap();
        assert!(file.exists());
        assert_eq!(links.len(), 2);
        assert_eq!(links.values().filter(|l| l.private).count(), 1);
        assert_eq!(file.load().unwrap().unwrap(), links);
    }

    #[test]
    fn test_load_or_seed_keeps_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file = DatastoreFile::new(temp_dir.path().join("datastore.txt"));

        let mut links = BTreeMap::new();
        let link = Link::with_linkdate("20120101_100000", "https://example.com");
        links.insert(link.linkdate.clone(), link);
        file.save(&links).unwrap();

        assert_eq!(file.load_or_seed().unwrap(), links);
    }

    #[test]
    fn test_corrupt_datastore() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("datastore.txt");
        fs::write(&path, "garbage").unwrap();

        let err = DatastoreFile::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::CorruptDatastore { .. }));

        // Corrupt data is never replaced by the seed
        let err = DatastoreFile::new(&path).load_or_seed().unwrap_err();
        assert!(matches!(err, StoreError::CorruptDatastore { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "garbage");
    }

    #[test]
    fn test_non_utf8_datastore_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("datastore.txt");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = DatastoreFile::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::CorruptDatastore { .. }));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("datastore.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        assert!(nested_path.exists());
        assert!(!temp_path_for(&nested_path).exists());
        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "test data");
    }

    #[test]
    fn test_temp_path_differs_from_target() {
        let dir = Path::new("/data");
        assert_eq!(
            temp_path_for(&dir.join("datastore.txt")),
            dir.join("datastore.txt.tmp")
        );
        assert_eq!(
            temp_path_for(&dir.join("datastore.tmp")),
            dir.join("datastore.tmp.tmp")
        );
        assert_ne!(
            temp_path_for(&dir.join("datastore.txt")),
            temp_path_for(&dir.join("datastore.tmp"))
        );
    }

    #[test]
    fn test_atomic_write_to_tmp_named_datastore() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("datastore.tmp");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_atomic_write_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("datastore.txt");

        atomic_write(&path, b"first version, longer").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }
}
