//! Object storage abstraction trait and common types.

use std::fmt;

use crate::error::Result;

/// A trait for blob stores addressed by bucket name and object key.
///
/// This is the only view the pipeline has of its storage collaborator. Reads
/// return the whole object; writes replace the whole object
/// (last-writer-wins).
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Read the full contents of an object.
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Create or overwrite an object.
    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()>;

    /// Check if an object exists.
    fn exists(&self, bucket: &str, key: &str) -> bool;
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.as_ref().get(bucket, key)
    }

    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        self.as_ref().put(bucket, key, body)
    }

    fn exists(&self, bucket: &str, key: &str) -> bool {
        self.as_ref().exists(bucket, key)
    }
}

/// Configuration for storage backends.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Whether to fsync each object after writing (file backend only).
    pub sync_writes: bool,

    /// Whether to create missing bucket directories on write (file backend only).
    pub create_buckets: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            sync_writes: false,
            create_buckets: true,
        }
    }
}

/// Error types specific to storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No object under the given bucket and key.
    ObjectNotFound { bucket: String, key: String },

    /// The bucket does not exist and the backend will not create it.
    BucketNotFound(String),

    /// Permission denied.
    AccessDenied(String),

    /// I/O error.
    IoError(String),

    /// Bucket or key that cannot be mapped onto the backend.
    InvalidName(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ObjectNotFound { bucket, key } => {
                write!(f, "Object not found: {bucket}/{key}")
            }
            StorageError::BucketNotFound(bucket) => write!(f, "Bucket not found: {bucket}"),
            StorageError::AccessDenied(name) => write!(f, "Access denied: {name}"),
            StorageError::IoError(msg) => write!(f, "I/O error: {msg}"),
            StorageError::InvalidName(name) => write!(f, "Invalid object name: {name}"),
        }
    }
}

impl std::error::Error for StorageError {}
