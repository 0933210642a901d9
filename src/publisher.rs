// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Artifact publishing to S3 object storage.
//!
//! The publisher performs a single `PutObject` per invocation. S3 replaces
//! the object atomically, so a failed write leaves the previous artifact
//! visible and the run can simply be repeated at the next scheduled tick.
//! Credential resolution is delegated to the ambient AWS configuration
//! chain; only the bucket, key, and per-object settings live here.

use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client, primitives::ByteStream, types::ObjectCannedAcl};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{chart::OutputArtifact, config::StorageTarget, error::Error};

/// Result of a successful artifact upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Bucket that received the artifact.
    pub bucket:      String,
    /// Object key the artifact was stored under.
    pub key:         String,
    /// Public URL of the stored object.
    pub url:         String,
    /// Timestamp of the upload.
    pub uploaded_at: DateTime<Utc>
}

/// Publishes rendered artifacts to a configured storage target.
#[derive(Debug, Clone)]
pub struct Publisher {
    client: Client,
    target: StorageTarget
}

impl Publisher {
    /// Creates a publisher from an existing S3 client.
    pub fn new(client: Client, target: StorageTarget) -> Self {
        Self {
            client,
            target
        }
    }

    /// Creates a publisher using the ambient AWS configuration chain.
    ///
    /// Region and credentials are resolved from the environment or instance
    /// profile, matching how the hosting platform provisions the job.
    pub async fn connect(target: StorageTarget) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(Client::new(&config), target)
    }

    /// Returns the storage target this publisher writes to.
    pub fn target(&self) -> &StorageTarget {
        &self.target
    }

    /// Uploads the artifact to the configured bucket and key.
    ///
    /// Sets the artifact content type and cache control header, and applies
    /// a public-read canned ACL when the target requests it. Re-running with
    /// an identical artifact overwrites the same key with identical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Publish`] when the storage write does not complete.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use chrono::Utc;
    /// use risp::{Publisher, StorageTarget, render_dashboard};
    ///
    /// # async fn example() -> Result<(), risp::Error> {
    /// let target = StorageTarget::new("stats-bucket", None, true)?;
    /// let publisher = Publisher::connect(target).await;
    /// let artifact = render_dashboard(&[], Utc::now());
    /// let receipt = publisher.publish(&artifact).await?;
    /// println!("published to {}", receipt.url);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn publish(&self, artifact: &OutputArtifact) -> Result<UploadReceipt, Error> {
        debug!(
            "Uploading {} bytes to s3://{}/{}",
            artifact.content.len(),
            self.target.bucket,
            self.target.key
        );

        let mut request = self
            .client
            .put_object()
            .bucket(&self.target.bucket)
            .key(&self.target.key)
            .body(ByteStream::from(artifact.content.clone().into_bytes()))
            .content_type(artifact.content_type)
            .cache_control(&self.target.cache_control);

        if self.target.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request.send().await.map_err(|e| {
            Error::publish(format!(
                "failed to upload s3://{}/{}: {e}",
                self.target.bucket, self.target.key
            ))
        })?;

        let receipt = UploadReceipt {
            bucket:      self.target.bucket.clone(),
            key:         self.target.key.clone(),
            url:         public_url(&self.target.bucket, &self.target.key),
            uploaded_at: Utc::now()
        };

        info!("Uploaded artifact to {}", receipt.url);

        Ok(receipt)
    }
}

/// Computes the public URL for an object in a bucket.
///
/// # Examples
///
/// ```
/// use risp::public_url;
///
/// assert_eq!(
///     public_url("stats-bucket", "github-stats.svg"),
///     "https://stats-bucket.s3.amazonaws.com/github-stats.svg"
/// );
/// ```
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com/{key}")
}
