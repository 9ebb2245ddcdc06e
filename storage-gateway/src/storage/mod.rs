/// Object storage layer
///
/// Handlers only see the [`ObjectStore`] trait. The production implementation
/// is [`S3Client`], backed by any S3-compatible service (MinIO, AWS, etc.).

pub mod s3_client;

#[cfg(test)]
pub mod memory;

pub use s3_client::S3Client;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::Serialize;
use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Backend(String),
}

/// Result of a completed put
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutObjectInfo {
    pub bucket: String,
    pub key: String,
    pub size: u64,
    pub etag: Option<String>,
}

/// One entry of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
}

/// Lazy listing; backend pages are fetched as the stream is polled.
pub type ObjectListing = BoxStream<'static, Result<ObjectEntry, StorageError>>;

/// Streaming read handle for an object's bytes.
pub type ObjectBody = BoxStream<'static, std::io::Result<Bytes>>;

/// Capabilities the gateway needs from an object storage backend.
///
/// Implementations must be safe to share between concurrent requests without
/// external locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `bucket/key`, replacing any existing object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        size: u64,
        content_type: Option<String>,
    ) -> Result<PutObjectInfo, StorageError>;

    /// Enumerate a bucket. With `recursive` every key under nested prefixes
    /// is returned; otherwise only the top level.
    fn list_objects(&self, bucket: &str, recursive: bool) -> ObjectListing;

    /// Open an object for streaming.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody, StorageError>;
}
