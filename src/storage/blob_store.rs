// Blob store - Whole-record byte storage keyed by name

use crate::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};

/// Key-value storage of whole records. The task store only ever reads and
/// writes complete records, so any backend offering these four calls works.
pub trait BlobStore {
    fn exists(&self, key: &str) -> Result<bool, StorageError>;
    fn create(&self, key: &str) -> Result<(), StorageError>;
    fn read_all(&self, key: &str) -> Result<Vec<u8>, StorageError>;
    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Records stored as files inside one directory.
pub struct FsBlobStore {
    root: PathBuf,
    atomic_writes: bool,
}

impl FsBlobStore {
    pub fn new(root: PathBuf, atomic_writes: bool) -> Self {
        Self {
            root,
            atomic_writes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl BlobStore for FsBlobStore {
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.path_for(key).try_exists()?)
    }

    fn create(&self, key: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::File::create(self.path_for(key))?;
        Ok(())
    }

    fn read_all(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.display().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);

        if self.atomic_writes {
            // Readers see either the old record or the new one, never a torn write.
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, bytes)?;
            fs::rename(&tmp, &path)?;
        } else {
            fs::write(&path, bytes)?;
        }

        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryBlobStore;

#[cfg(test)]
mod memory {
    use super::BlobStore;
    use crate::error::StorageError;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    /// In-memory store for tests. Clones share the same records, so a test can
    /// keep a handle while the store itself is boxed inside a `TaskStore`.
    #[derive(Clone, Default)]
    pub struct MemoryBlobStore {
        records: Rc<RefCell<HashMap<String, Vec<u8>>>>,
        writes: Rc<Cell<usize>>,
        fail_writes: Rc<Cell<bool>>,
        fail_reads: Rc<Cell<bool>>,
    }

    impl MemoryBlobStore {
        pub fn with_record(key: &str, content: &str) -> Self {
            let store = Self::default();
            store
                .records
                .borrow_mut()
                .insert(key.to_string(), content.as_bytes().to_vec());
            store
        }

        pub fn content(&self, key: &str) -> Option<String> {
            self.records
                .borrow()
                .get(key)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        }

        /// Number of `write_all` calls so far, including failed ones.
        pub fn write_count(&self) -> usize {
            self.writes.get()
        }

        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.set(fail);
        }

        /// Makes `exists` and `read_all` fail, like an unreadable disk.
        pub fn fail_reads(&self, fail: bool) {
            self.fail_reads.set(fail);
        }

        fn check_reads(&self) -> Result<(), StorageError> {
            if self.fail_reads.get() {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "unreadable store",
                )));
            }
            Ok(())
        }
    }

    impl BlobStore for MemoryBlobStore {
        fn exists(&self, key: &str) -> Result<bool, StorageError> {
            self.check_reads()?;
            Ok(self.records.borrow().contains_key(key))
        }

        fn create(&self, key: &str) -> Result<(), StorageError> {
            self.records
                .borrow_mut()
                .entry(key.to_string())
                .or_default();
            Ok(())
        }

        fn read_all(&self, key: &str) -> Result<Vec<u8>, StorageError> {
            self.check_reads()?;
            self.records
                .borrow()
                .get(key)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(key.to_string()))
        }

        fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
            self.writes.set(self.writes.get() + 1);
            if self.fail_writes.get() {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only store",
                )));
            }
            self.records
                .borrow_mut()
                .insert(key.to_string(), bytes.to_vec());
            Ok(())
        }
    }
}
