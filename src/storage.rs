use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use s3::types::{Delete, ObjectIdentifier};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::models::{ImageRef, UploadFile};

// 1. StorageService Contract
/// StorageService
///
/// The abstract contract for the image bucket. Handlers never talk to S3 directly,
/// so the real client and `MockStorageService` are interchangeable.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the configured bucket exists. Used in the `Env::Local` setup to
    /// provision the MinIO bucket.
    async fn ensure_bucket_exists(&self);

    /// Uploads every file and returns one reference per file, in input order.
    /// Fails as a whole on the first failed upload, after removing the objects
    /// already written by this call.
    async fn upload_images(&self, files: Vec<UploadFile>) -> Result<Vec<ImageRef>, String>;

    /// Removes the given objects with a single bulk request.
    ///
    /// An empty list is a successful no-op. Returns `false` when the store refused
    /// or partially failed the delete.
    async fn delete_images(&self, images: &[ImageRef]) -> bool;
}

/// sanitize_key
///
/// Strips directory navigation (`..`, `.`) and empty segments from a
/// client-supplied key segment.
pub fn sanitize_key(key: &str) -> String {
    key.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// object_key
///
/// Builds the bucket key for an uploaded image: `restaurants/<uuid>_<file name>`.
/// Only the last path segment of the client file name is kept.
pub fn object_key(file_name: &str) -> String {
    let sanitized = sanitize_key(file_name);
    let base = sanitized.rsplit('/').next().unwrap_or_default();
    let base = if base.is_empty() { "image" } else { base };
    format!("restaurants/{}_{}", Uuid::new_v4(), base)
}

// 2. The Real Implementation (S3/MinIO)
/// S3StorageClient
///
/// Implementation over the AWS SDK. Path-style addressing keeps it compatible with
/// MinIO and other S3 gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_base_url: String,
}

impl S3StorageClient {
    /// new
    ///
    /// Constructs the S3 client using credentials and configuration from AppConfig.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        let client = s3::Client::from_conf(config);

        Self {
            client,
            bucket_name: bucket.to_string(),
            public_base_url: format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket on an existing bucket is an error we can ignore.
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, error = ?e, "create_bucket skipped");
        }
    }

    async fn upload_images(&self, files: Vec<UploadFile>) -> Result<Vec<ImageRef>, String> {
        let mut images = Vec::with_capacity(files.len());

        for file in files {
            let key = object_key(&file.file_name);

            let sent = self
                .client
                .put_object()
                .bucket(&self.bucket_name)
                .key(&key)
                .content_type(&file.content_type)
                .body(ByteStream::from(file.bytes))
                .send()
                .await;

            if let Err(e) = sent {
                if !self.delete_images(&images).await {
                    tracing::warn!(count = images.len(), "orphaned objects after failed upload");
                }
                return Err(format!("upload of '{}' failed: {}", file.file_name, e));
            }

            tracing::debug!(key = %key, "image uploaded");

            images.push(ImageRef {
                bucket: self.bucket_name.clone(),
                url: self.object_url(&key),
                key,
            });
        }

        Ok(images)
    }

    async fn delete_images(&self, images: &[ImageRef]) -> bool {
        if images.is_empty() {
            return true;
        }

        let objects = match images
            .iter()
            .map(|img| ObjectIdentifier::builder().key(&img.key).build())
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(objects) => objects,
            Err(e) => {
                tracing::error!(error = ?e, "invalid object identifier");
                return false;
            }
        };

        let delete = match Delete::builder().set_objects(Some(objects)).quiet(true).build() {
            Ok(delete) => delete,
            Err(e) => {
                tracing::error!(error = ?e, "invalid bulk delete request");
                return false;
            }
        };

        match self
            .client
            .delete_objects()
            .bucket(&self.bucket_name)
            .delete(delete)
            .send()
            .await
        {
            // In quiet mode only failed keys are reported back.
            Ok(output) => {
                let failed = output.errors();
                if !failed.is_empty() {
                    tracing::warn!(failed = failed.len(), "bulk delete partially failed");
                }
                failed.is_empty()
            }
            Err(e) => {
                tracing::error!(error = ?e, "bulk delete failed");
                false
            }
        }
    }
}

// 3. The Mock Implementation (For Tests)
/// MockStorageService
///
/// In-process stand-in for the bucket. Tracks the keys it currently holds and the
/// keys that were deleted so tests can assert on the reconciliation side effects.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    /// Upload fails on the file at this index, after storing the ones before it.
    pub fail_after: Option<usize>,
    stored: Arc<Mutex<Vec<String>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn new_failing_after(uploads: usize) -> Self {
        Self {
            fail_after: Some(uploads),
            ..Self::default()
        }
    }

    /// Keys uploaded and not deleted since.
    pub fn stored_keys(&self) -> Vec<String> {
        self.stored
            .lock()
            .map(|keys| keys.clone())
            .unwrap_or_default()
    }

    /// Keys passed to successful `delete_images` calls, in call order.
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted
            .lock()
            .map(|keys| keys.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {
        // No-op in mock environment.
    }

    async fn upload_images(&self, files: Vec<UploadFile>) -> Result<Vec<ImageRef>, String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }

        let mut images = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            if self.fail_after == Some(index) {
                self.delete_images(&images).await;
                return Err(format!("Mock Storage Error: upload of '{}' failed", file.file_name));
            }

            let key = object_key(&file.file_name);
            if let Ok(mut stored) = self.stored.lock() {
                stored.push(key.clone());
            }
            images.push(ImageRef {
                bucket: "mock-bucket".to_string(),
                url: format!("http://localhost:9000/mock-bucket/{}", key),
                key,
            });
        }
        Ok(images)
    }

    async fn delete_images(&self, images: &[ImageRef]) -> bool {
        if images.is_empty() {
            return true;
        }
        if self.should_fail {
            return false;
        }
        if let Ok(mut stored) = self.stored.lock() {
            stored.retain(|key| !images.iter().any(|img| &img.key == key));
        }
        if let Ok(mut keys) = self.deleted.lock() {
            keys.extend(images.iter().map(|img| img.key.clone()));
        }
        true
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
