//! S3 object storage

use crate::error::{build_error, provider_error};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, IndexDocument,
    PublicAccessBlockConfiguration, WebsiteConfiguration,
};
use siteflow_cloud::provider::{BucketCreation, ObjectStorage, ProviderError, ProviderResult, PutObject};
use siteflow_cloud::Service;

/// The one region that rejects an explicit location constraint
const DEFAULT_REGION: &str = "us-east-1";

pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Location constraint for `region`, if one must be sent
pub fn location_constraint(region: &str) -> Option<CreateBucketConfiguration> {
    if region == DEFAULT_REGION {
        return None;
    }
    Some(
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build(),
    )
}

/// Public-access block that still blocks ACLs but lets a bucket policy
/// grant public read
pub fn policy_friendly_access_block() -> PublicAccessBlockConfiguration {
    PublicAccessBlockConfiguration::builder()
        .block_public_acls(true)
        .ignore_public_acls(true)
        .block_public_policy(false)
        .restrict_public_buckets(false)
        .build()
}

/// Ownership implied by a `HeadBucket` status; `None` means the bucket
/// has to be created.
///
/// Needed because `CreateBucket` in us-east-1 answers 200 for a bucket the
/// caller already owns.
pub fn ownership_from_head(status: u16) -> Option<BucketCreation> {
    match status {
        200..=299 => Some(BucketCreation::OwnedByCaller),
        403 => Some(BucketCreation::OwnedByOther),
        _ => None,
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn create_bucket(&self, name: &str, region: &str) -> ProviderResult<BucketCreation> {
        let status = match self.client.head_bucket().bucket(name).send().await {
            Ok(_) => 200,
            Err(err) => match err.raw_response() {
                Some(raw) => raw.status().as_u16(),
                None => return Err(provider_error(Service::ObjectStorage, err)),
            },
        };
        if let Some(ownership) = ownership_from_head(status) {
            tracing::debug!("HeadBucket {} answered {}", name, status);
            return Ok(ownership);
        }

        let result = self
            .client
            .create_bucket()
            .bucket(name)
            .set_create_bucket_configuration(location_constraint(region))
            .send()
            .await;

        match result {
            Ok(_) => Ok(BucketCreation::Created),
            Err(err) => {
                if let Some(e) = err.as_service_error() {
                    if e.is_bucket_already_owned_by_you() {
                        return Ok(BucketCreation::OwnedByCaller);
                    }
                    if e.is_bucket_already_exists() {
                        return Ok(BucketCreation::OwnedByOther);
                    }
                }
                Err(provider_error(Service::ObjectStorage, err))
            }
        }
    }

    async fn allow_public_policy(&self, name: &str) -> ProviderResult<()> {
        self.client
            .put_public_access_block()
            .bucket(name)
            .public_access_block_configuration(policy_friendly_access_block())
            .send()
            .await
            .map_err(|e| provider_error(Service::ObjectStorage, e))?;
        Ok(())
    }

    async fn put_bucket_policy(&self, name: &str, policy: &str) -> ProviderResult<()> {
        tracing::debug!("Bucket policy for {}: {}", name, policy);
        self.client
            .put_bucket_policy()
            .bucket(name)
            .policy(policy)
            .send()
            .await
            .map_err(|e| provider_error(Service::ObjectStorage, e))?;
        Ok(())
    }

    async fn put_bucket_website(&self, name: &str, index_suffix: &str) -> ProviderResult<()> {
        let index = IndexDocument::builder()
            .suffix(index_suffix)
            .build()
            .map_err(|e| build_error(Service::ObjectStorage, e))?;
        let website = WebsiteConfiguration::builder().index_document(index).build();

        self.client
            .put_bucket_website()
            .bucket(name)
            .website_configuration(website)
            .send()
            .await
            .map_err(|e| provider_error(Service::ObjectStorage, e))?;
        Ok(())
    }

    async fn put_object(&self, object: PutObject) -> ProviderResult<()> {
        let body = ByteStream::from_path(&object.path).await.map_err(|e| {
            ProviderError::new(
                Service::ObjectStorage,
                None,
                format!("cannot read {}: {}", object.path.display(), e),
            )
        })?;

        self.client
            .put_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .content_type(&object.content_type)
            .set_metadata(Some(object.metadata))
            .body(body)
            .send()
            .await
            .map_err(|e| provider_error(Service::ObjectStorage, e))?;
        Ok(())
    }
}
