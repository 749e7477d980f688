//! S3 implementation of [`ObjectStore`].

use std::path::Path;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;

use crate::{ObjectStore, PresignedUrl, StorageError, DOWNLOAD_URL_TTL, UPLOAD_URL_TTL};

/// S3 configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket holding audio segments and rendered videos (`S3_BUCKET`).
    pub bucket: String,
}

impl S3Config {
    /// Load configuration from the environment. Credentials and region
    /// come from the standard AWS provider chain.
    pub fn from_env() -> Self {
        let bucket = std::env::var("S3_BUCKET").expect("S3_BUCKET must be set");
        Self { bucket }
    }
}

/// Production object store backed by one S3 bucket.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Build a store from the ambient AWS environment.
    pub async fn from_env(config: S3Config) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_s3::Client::new(&aws_config),
            bucket: config.bucket,
        }
    }

    fn presign_config(
        ttl: std::time::Duration,
        key: &str,
        operation: &'static str,
    ) -> Result<PresigningConfig, StorageError> {
        PresigningConfig::expires_in(ttl).map_err(|e| StorageError::Presign {
            operation,
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    async fn sign_upload(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(Self::presign_config(UPLOAD_URL_TTL, key, "upload")?)
            .await
            .map_err(|e| StorageError::Presign {
                operation: "upload",
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            expires_in: UPLOAD_URL_TTL,
        })
    }

    async fn sign_download(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(Self::presign_config(DOWNLOAD_URL_TTL, key, "download")?)
            .await
            .map_err(|e| StorageError::Presign {
                operation: "download",
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            expires_in: DOWNLOAD_URL_TTL,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn upload(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: format!("failed to read '{}': {e}", local_path.display()),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(key, path = %local_path.display(), "Uploaded object");
        Ok(())
    }
}
