//! In-memory object store for testing and local runs.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::storage::traits::{ObjectStore, StorageError};

type ObjectMap = HashMap<(String, String), Box<[u8]>>;

/// An in-memory object store.
///
/// Objects are kept as `Box<[u8]>` keyed by `(bucket, key)`. Clones share the
/// same underlying map, so a handle given to a workflow and a handle kept by
/// a test observe the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    /// The objects stored in memory.
    objects: Arc<Mutex<ObjectMap>>,
    /// Buckets that answer every request with `AccessDenied`.
    denied: Arc<Mutex<HashSet<String>>>,
}

impl MemoryObjectStore {
    /// Create a new, empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> Result<MutexGuard<'_, ObjectMap>> {
        self.objects
            .lock()
            .map_err(|_| StorageError::IoError("memory store lock poisoned".to_string()).into())
    }

    fn check_access(&self, bucket: &str, key: &str) -> Result<()> {
        let denied = self
            .denied
            .lock()
            .map_err(|_| StorageError::IoError("memory store lock poisoned".to_string()))?;
        if denied.contains(bucket) {
            return Err(StorageError::AccessDenied(format!("{bucket}/{key}")).into());
        }
        Ok(())
    }

    /// Make every subsequent request against `bucket` fail with `AccessDenied`.
    pub fn deny_bucket(&self, bucket: &str) {
        if let Ok(mut denied) = self.denied.lock() {
            denied.insert(bucket.to_string());
        }
    }

    /// Get the number of objects stored.
    pub fn object_count(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    /// List the keys stored in a bucket, sorted.
    pub fn keys(&self, bucket: &str) -> Result<Vec<String>> {
        let objects = self.objects()?;
        let mut keys: Vec<String> = objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.check_access(bucket, key)?;

        let objects = self.objects()?;
        let data = objects
            .get(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| StorageError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;

        Ok(data.to_vec())
    }

    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        self.check_access(bucket, key)?;

        let mut objects = self.objects()?;
        objects.insert(
            (bucket.to_string(), key.to_string()),
            body.to_vec().into_boxed_slice(),
        );
        Ok(())
    }

    fn exists(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .map(|objects| objects.contains_key(&(bucket.to_string(), key.to_string())))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn test_memory_store_creation() {
        let store = MemoryObjectStore::new();
        assert_eq!(store.object_count(), 0);
    }

    #[test]
    fn test_put_and_get() {
        let store = MemoryObjectStore::new();

        store.put("bucket", "hello.txt", b"Hello, World!").unwrap();

        assert!(store.exists("bucket", "hello.txt"));
        assert!(!store.exists("other", "hello.txt"));
        assert_eq!(store.get("bucket", "hello.txt").unwrap(), b"Hello, World!");
    }

    #[test]
    fn test_put_overwrites() {
        let store = MemoryObjectStore::new();

        store.put("bucket", "score.txt", b"10.0%").unwrap();
        store.put("bucket", "score.txt", b"20.0%").unwrap();

        assert_eq!(store.get("bucket", "score.txt").unwrap(), b"20.0%");
        assert_eq!(store.object_count(), 1);
    }

    #[test]
    fn test_object_not_found() {
        let store = MemoryObjectStore::new();

        let err = store.get("bucket", "missing").unwrap_err();
        match err {
            PipelineError::Storage(StorageError::ObjectNotFound { bucket, key }) => {
                assert_eq!(bucket, "bucket");
                assert_eq!(key, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_clones_share_objects() {
        let store = MemoryObjectStore::new();
        let handle = store.clone();

        handle.put("bucket", "a", b"1").unwrap();

        assert!(store.exists("bucket", "a"));
    }

    #[test]
    fn test_denied_bucket() {
        let store = MemoryObjectStore::new();
        store.put("models", "model.joblib", b"x").unwrap();
        store.deny_bucket("models");

        assert!(matches!(
            store.get("models", "model.joblib"),
            Err(PipelineError::Storage(StorageError::AccessDenied(_)))
        ));
        assert!(matches!(
            store.put("models", "model.joblib", b"y"),
            Err(PipelineError::Storage(StorageError::AccessDenied(_)))
        ));
        store.put("data", "x", b"ok").unwrap();
    }

    #[test]
    fn test_keys_are_sorted_per_bucket() {
        let store = MemoryObjectStore::new();
        store.put("data", "y_test.joblib", b"").unwrap();
        store.put("data", "x_test.joblib", b"").unwrap();
        store.put("models", "model.joblib", b"").unwrap();

        assert_eq!(
            store.keys("data").unwrap(),
            vec!["x_test.joblib".to_string(), "y_test.joblib".to_string()]
        );
    }
}
