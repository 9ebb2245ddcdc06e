//! In-memory `ObjectStore` used by handler tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use super::{ObjectBody, ObjectEntry, ObjectListing, ObjectStore, PutObjectInfo, StorageError};

#[derive(Clone, Default)]
pub struct MemoryStore {
    buckets: Arc<Mutex<BTreeMap<String, BTreeMap<String, Bytes>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket: &str) -> Self {
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_default();
        self
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.buckets.lock().unwrap().get(bucket)?.get(key).cloned()
    }

    pub fn object_count(&self, bucket: &str) -> usize {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .map_or(0, |objects| objects.len())
    }
}

fn no_such_bucket(bucket: &str) -> StorageError {
    StorageError::Backend(format!("NoSuchBucket: The specified bucket does not exist: {}", bucket))
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        size: u64,
        _content_type: Option<String>,
    ) -> Result<PutObjectInfo, StorageError> {
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets.get_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        objects.insert(key.to_string(), body);

        Ok(PutObjectInfo {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size,
            etag: None,
        })
    }

    fn list_objects(&self, bucket: &str, recursive: bool) -> ObjectListing {
        let buckets = self.buckets.lock().unwrap();
        let entries: Vec<Result<ObjectEntry, StorageError>> = match buckets.get(bucket) {
            Some(objects) => {
                let mut seen_prefixes = Vec::new();
                objects
                    .iter()
                    .filter_map(|(key, data)| match key.find('/') {
                        Some(idx) if !recursive => {
                            let prefix = key[..=idx].to_string();
                            if seen_prefixes.contains(&prefix) {
                                None
                            } else {
                                seen_prefixes.push(prefix.clone());
                                Some(Ok(ObjectEntry { key: prefix, size: 0 }))
                            }
                        }
                        _ => Some(Ok(ObjectEntry {
                            key: key.clone(),
                            size: data.len() as u64,
                        })),
                    })
                    .collect()
            }
            None => vec![Err(no_such_bucket(bucket))],
        };
        stream::iter(entries).boxed()
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody, StorageError> {
        let data = self.object(bucket, key).ok_or_else(|| {
            StorageError::Backend(format!("NoSuchKey: The specified key does not exist: {}", key))
        })?;

        // Small chunks so the download path is exercised as a real stream
        let chunks: Vec<std::io::Result<Bytes>> = data
            .chunks(4)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use pretty_assertions::assert_eq;

    async fn keys(store: &MemoryStore, bucket: &str, recursive: bool) -> Vec<String> {
        store
            .list_objects(bucket, recursive)
            .map_ok(|entry| entry.key)
            .try_collect()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_top_level_listing_collapses_prefixes() {
        let store = MemoryStore::new().with_bucket("media");
        for key in ["top.txt", "photos/a.jpg", "photos/b.jpg", "photos/2024/c.jpg"] {
            store
                .put_object("media", key, Bytes::from_static(b"xy"), 2, None)
                .await
                .unwrap();
        }

        assert_eq!(keys(&store, "media", false).await, vec!["photos/", "top.txt"]);
        assert_eq!(
            keys(&store, "media", true).await,
            vec!["photos/2024/c.jpg", "photos/a.jpg", "photos/b.jpg", "top.txt"]
        );
    }

    #[tokio::test]
    async fn test_collapsed_prefix_reports_zero_size() {
        let store = MemoryStore::new().with_bucket("media");
        store
            .put_object("media", "photos/a.jpg", Bytes::from_static(b"xyz"), 3, None)
            .await
            .unwrap();

        let entries: Vec<ObjectEntry> = store.list_objects("media", false).try_collect().await.unwrap();
        assert_eq!(
            entries,
            vec![ObjectEntry {
                key: "photos/".to_string(),
                size: 0
            }]
        );
    }
}
