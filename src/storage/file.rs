//! Directory-backed object store.
//!
//! Each bucket is a sub-directory of the root and each key a file inside it,
//! which is the layout local object-storage emulators expose on disk.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{PipelineError, Result};
use crate::storage::traits::{ObjectStore, StorageConfig, StorageError};

/// A file-based object store.
#[derive(Debug)]
pub struct FileObjectStore {
    /// The root directory holding one directory per bucket.
    root: PathBuf,
    /// Storage configuration.
    config: StorageConfig,
}

impl FileObjectStore {
    /// Create a new file store rooted at the given directory.
    pub fn new<P: AsRef<Path>>(root: P, config: StorageConfig) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| {
                StorageError::IoError(format!("Failed to create directory: {e}"))
            })?;
        }

        if !root.is_dir() {
            return Err(PipelineError::from(StorageError::IoError(format!(
                "Path is not a directory: {}",
                root.display()
            ))));
        }

        Ok(FileObjectStore { root, config })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(StorageError::InvalidName(name.to_string()).into());
        }
        Ok(())
    }

    fn bucket_path(&self, bucket: &str) -> Result<PathBuf> {
        Self::validate_name(bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        Self::validate_name(key)?;
        Ok(self.bucket_path(bucket)?.join(key))
    }

    fn map_io_error(err: io::Error, bucket: &str, key: &str) -> StorageError {
        match err.kind() {
            io::ErrorKind::NotFound => StorageError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            io::ErrorKind::PermissionDenied => StorageError::AccessDenied(format!("{bucket}/{key}")),
            _ => StorageError::IoError(err.to_string()),
        }
    }
}

impl ObjectStore for FileObjectStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        let mut file = File::open(&path).map_err(|e| Self::map_io_error(e, bucket, key))?;

        let mut body = Vec::new();
        file.read_to_end(&mut body)
            .map_err(|e| Self::map_io_error(e, bucket, key))?;

        debug!("read {} bytes from {}", body.len(), path.display());
        Ok(body)
    }

    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        let bucket_dir = self.bucket_path(bucket)?;
        let path = self.object_path(bucket, key)?;

        if !bucket_dir.is_dir() {
            if !self.config.create_buckets {
                return Err(StorageError::BucketNotFound(bucket.to_string()).into());
            }
            fs::create_dir_all(&bucket_dir).map_err(|e| Self::map_io_error(e, bucket, key))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Self::map_io_error(e, bucket, key))?;

        file.write_all(body)
            .map_err(|e| Self::map_io_error(e, bucket, key))?;
        if self.config.sync_writes {
            file.sync_all()
                .map_err(|e| Self::map_io_error(e, bucket, key))?;
        }

        debug!("wrote {} bytes to {}", body.len(), path.display());
        Ok(())
    }

    fn exists(&self, bucket: &str, key: &str) -> bool {
        self.object_path(bucket, key)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, FileObjectStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileObjectStore::new(temp_dir.path(), StorageConfig::default()).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_put_creates_bucket_directory() {
        let (temp_dir, store) = create_test_store();

        store.put("local-ml-flow-data", "score.txt", b"42.0%").unwrap();

        let on_disk = temp_dir.path().join("local-ml-flow-data").join("score.txt");
        assert_eq!(fs::read(on_disk).unwrap(), b"42.0%");
        assert!(store.exists("local-ml-flow-data", "score.txt"));
    }

    #[test]
    fn test_get_round_trips_bytes() {
        let (_temp_dir, store) = create_test_store();
        let body: Vec<u8> = (0u8..=255).collect();

        store.put("bucket", "blob.bin", &body).unwrap();

        assert_eq!(store.get("bucket", "blob.bin").unwrap(), body);
    }

    #[test]
    fn test_missing_object() {
        let (_temp_dir, store) = create_test_store();

        let err = store.get("bucket", "model.joblib").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Storage error: Object not found: bucket/model.joblib"
        );
    }

    #[test]
    fn test_bucket_creation_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig {
            create_buckets: false,
            ..StorageConfig::default()
        };
        let store = FileObjectStore::new(temp_dir.path(), config).unwrap();

        let err = store.put("bucket", "a", b"x").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Storage(StorageError::BucketNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let (_temp_dir, store) = create_test_store();

        assert!(store.put("..", "a", b"x").is_err());
        assert!(store.put("bucket", "../a", b"x").is_err());
        assert!(!store.exists("bucket", ""));
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("not_a_dir");
        fs::write(&file_path, b"").unwrap();

        assert!(FileObjectStore::new(&file_path, StorageConfig::default()).is_err());
    }
}
