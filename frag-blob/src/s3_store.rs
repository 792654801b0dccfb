use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{primitives::ByteStream as AwsByteStream, Client};
use bytes::Bytes;
use tracing::{debug, error};

use crate::{
    DefaultKeyStrategy, FragmentStore, KeyStrategy, StoreCapabilities, StoreError, StoreResult,
};

/// Connection settings for an S3-compatible bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, RustFS, localstack). Switches to path-style addressing.
    pub endpoint_url: Option<String>,
}

impl S3Config {
    pub fn new<S: Into<String>>(bucket: S) -> Self {
        Self {
            bucket: bucket.into(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
        }
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint_url<S: Into<String>>(mut self, endpoint_url: S) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }
}

/// Payload store backed by S3. Objects are keyed `"{owner}/{id}"`.
///
/// Every transport failure is logged with its bucket and key and surfaced as
/// [`StoreError::Backend`]; SDK error types never reach callers.
#[derive(Clone)]
pub struct S3DataStore {
    client: Client,
    bucket: String,
    keys: Arc<dyn KeyStrategy>,
}

impl S3DataStore {
    /// Build a client from the AWS default provider chain plus `config`
    pub async fn connect(config: S3Config) -> StoreResult<Self> {
        if config.bucket.trim().is_empty() {
            return Err(StoreError::config("S3 bucket name must not be empty"));
        }

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(config.endpoint_url.is_some())
                .build(),
        );

        Ok(Self::from_client(client, config.bucket))
    }

    /// Wrap an already configured client
    pub fn from_client<S: Into<String>>(client: Client, bucket: S) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            keys: Arc::new(DefaultKeyStrategy),
        }
    }

    pub fn with_key_strategy<K: KeyStrategy + 'static>(mut self, keys: K) -> Self {
        self.keys = Arc::new(keys);
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_keys(&self, owner_id: &str) -> StoreResult<Vec<String>> {
        let prefix = self.keys.owner_prefix(owner_id);
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&prefix)
            .into_paginator()
            .send();

        let mut ids = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| {
                error!(error = %err, bucket = %self.bucket, prefix = %prefix, "Error listing fragment data in S3");
                StoreError::backend("unable to list fragment data", err)
            })?;

            ids.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .filter_map(|key| self.keys.id_from_key(owner_id, key)),
            );
        }

        Ok(ids)
    }
}

#[async_trait]
impl FragmentStore<Bytes> for S3DataStore {
    async fn put(&self, owner_id: &str, id: &str, value: Bytes) -> StoreResult<()> {
        let key = self.keys.object_key(owner_id, id);
        let size = value.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(AwsByteStream::from(value))
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, bucket = %self.bucket, key = %key, "Error uploading fragment data to S3");
                StoreError::backend("unable to upload fragment data", err)
            })?;

        debug!(bucket = %self.bucket, key = %key, size, "fragment data uploaded");
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> StoreResult<Option<Bytes>> {
        let key = self.keys.object_key(owner_id, id);

        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    return Ok(None);
                }
                error!(error = %err, bucket = %self.bucket, key = %key, "Error reading fragment data from S3");
                return Err(StoreError::backend("unable to read fragment data", err));
            }
        };

        let body = output.body.collect().await.map_err(|err| {
            error!(error = %err, bucket = %self.bucket, key = %key, "Error streaming fragment data from S3");
            StoreError::backend("unable to read fragment data", err)
        })?;

        Ok(Some(body.into_bytes()))
    }

    async fn query(&self, owner_id: &str) -> StoreResult<Vec<Bytes>> {
        let mut values = Vec::new();
        for id in self.list_keys(owner_id).await? {
            // listed objects can vanish before we read them
            if let Some(value) = self.get(owner_id, &id).await? {
                values.push(value);
            }
        }
        Ok(values)
    }

    async fn keys(&self, owner_id: &str) -> StoreResult<Vec<String>> {
        self.list_keys(owner_id).await
    }

    async fn delete(&self, owner_id: &str, id: &str) -> StoreResult<()> {
        let key = self.keys.object_key(owner_id, id);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, bucket = %self.bucket, key = %key, "Error deleting fragment data from S3");
                StoreError::backend("unable to delete fragment data", err)
            })?;

        Ok(())
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::remote("s3")
    }
}
