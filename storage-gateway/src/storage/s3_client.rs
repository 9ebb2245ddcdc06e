/// S3-compatible object storage client
///
/// Wraps `aws-sdk-s3` with static credentials and path-style addressing,
/// which is what MinIO and most self-hosted backends expect.

use std::io;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Builder as S3ConfigBuilder, Credentials};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use super::{ObjectBody, ObjectEntry, ObjectListing, ObjectStore, PutObjectInfo, StorageError};
use crate::config::StorageConfig;

/// S3 client shared by all request handlers
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    endpoint_url: String,
}

impl S3Client {
    /// Create a new S3 client
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let endpoint_url = config.endpoint_url();
        info!("Initializing S3 client for endpoint: {}", endpoint_url);

        let credentials = Credentials::new(
            config.access_key.as_str(),
            config.secret_key.as_str(),
            None,
            None,
            "storage-gateway",
        );

        let timeouts = TimeoutConfig::builder()
            .operation_timeout(config.operation_timeout)
            .build();

        let s3_config = S3ConfigBuilder::new()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .endpoint_url(endpoint_url.as_str())
            .force_path_style(true)
            .timeout_config(timeouts)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            endpoint_url,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

fn backend_error<E>(err: E) -> StorageError
where
    E: std::error::Error,
{
    StorageError::Backend(DisplayErrorContext(err).to_string())
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        size: u64,
        content_type: Option<String>,
    ) -> Result<PutObjectInfo, StorageError> {
        debug!("Putting object {}/{} ({} bytes)", bucket, key, size);

        let content_length = i64::try_from(size)
            .context("object size exceeds i64")
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(content_length)
            .set_content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(backend_error)?;

        Ok(PutObjectInfo {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size,
            etag: output.e_tag().map(|tag| tag.trim_matches('"').to_string()),
        })
    }

    fn list_objects(&self, bucket: &str, recursive: bool) -> ObjectListing {
        debug!("Listing objects in {} (recursive: {})", bucket, recursive);

        let mut request = self.client.list_objects_v2().bucket(bucket);
        if !recursive {
            request = request.delimiter("/");
        }
        let pages = request.into_paginator().send();

        stream::unfold(pages, |mut pages| async move {
            pages.next().await.map(|page| (page, pages))
        })
        .flat_map(|page| {
            let entries: Vec<Result<ObjectEntry, StorageError>> = match page {
                Ok(output) => {
                    let objects = output.contents().iter().filter_map(|object| {
                        object.key().map(|key| ObjectEntry {
                            key: key.to_string(),
                            size: object.size().unwrap_or_default().max(0) as u64,
                        })
                    });
                    // Only populated for delimited listings
                    let prefixes = output.common_prefixes().iter().filter_map(|prefix| {
                        prefix.prefix().map(|key| ObjectEntry {
                            key: key.to_string(),
                            size: 0,
                        })
                    });
                    objects.chain(prefixes).map(Ok).collect()
                }
                Err(err) => vec![Err(backend_error(err))],
            };
            stream::iter(entries)
        })
        .boxed()
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody, StorageError> {
        debug!("Opening object {}/{}", bucket, key);

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;

        let body = stream::unfold(output.body, |mut body| async move {
            body.next()
                .await
                .map(|chunk| (chunk.map_err(|e| io::Error::new(io::ErrorKind::Other, e)), body))
        })
        .boxed();

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn storage_config(endpoint: &str, use_ssl: bool) -> StorageConfig {
        StorageConfig {
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            endpoint: endpoint.to_string(),
            use_ssl,
            region: "us-east-1".to_string(),
            operation_timeout: Duration::from_secs(30),
        }
    }

    #[tokio::test]
    async fn test_client_uses_plain_http_by_default() {
        let client = S3Client::new(&storage_config("localhost:9000", false)).unwrap();
        assert_eq!(client.endpoint_url(), "http://localhost:9000");
    }

    #[tokio::test]
    async fn test_client_honours_tls_flag() {
        let client = S3Client::new(&storage_config("minio.local:9000", true)).unwrap();
        assert_eq!(client.endpoint_url(), "https://minio.local:9000");
    }

    #[test]
    fn test_backend_error_keeps_source_text() {
        let err = backend_error(io::Error::new(io::ErrorKind::NotFound, "NoSuchKey"));
        assert!(err.to_string().contains("NoSuchKey"));
    }
}
