//! Storage bucket provisioning

use crate::error::{CloudError, Result, Step};
use crate::error_table;
use crate::provider::{BucketCreation, ObjectStorage};
use std::sync::Arc;

/// Default document served for directory requests
pub const INDEX_DOCUMENT: &str = "index.html";

/// Regions whose website endpoint still uses the `s3-website-<region>` form
const DASH_WEBSITE_REGIONS: &[&str] = &[
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "eu-west-1",
    "sa-east-1",
    "us-gov-west-1",
];

/// Bucket after the create-or-retrieve check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedBucket {
    pub name: String,
    pub region: String,
    /// True when the bucket was already ours before this run
    pub existed: bool,
}

impl ProvisionedBucket {
    /// Regional static-website endpoint of this bucket
    pub fn website_endpoint(&self) -> String {
        website_endpoint(&self.name, &self.region)
    }
}

/// Bucket with the public-read policy applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicBucket(ProvisionedBucket);

/// Bucket serving as a static website
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteBucket {
    pub bucket: ProvisionedBucket,
    pub endpoint: String,
}

/// Static-website endpoint for a bucket in `region`
pub fn website_endpoint(bucket: &str, region: &str) -> String {
    if DASH_WEBSITE_REGIONS.contains(&region) {
        format!("{bucket}.s3-website-{region}.amazonaws.com")
    } else {
        format!("{bucket}.s3-website.{region}.amazonaws.com")
    }
}

/// Policy granting anonymous read on every object in the bucket
pub fn public_read_policy(bucket: &str) -> String {
    serde_json::json!({
        "Version": "2008-10-17",
        "Statement": [{
            "Sid": "PublicReadGetObject",
            "Effect": "Allow",
            "Principal": { "AWS": "*" },
            "Action": "s3:GetObject",
            "Resource": format!("arn:aws:s3:::{bucket}/*"),
        }]
    })
    .to_string()
}

/// Ensures the site bucket exists and is configured for website hosting
pub struct BucketProvisioner {
    storage: Arc<dyn ObjectStorage>,
}

impl BucketProvisioner {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Create the bucket, or confirm we already own it
    ///
    /// A name held by another account is fatal: bucket names are global.
    pub async fn create_or_retrieve(&self, name: &str, region: &str) -> Result<ProvisionedBucket> {
        tracing::debug!("Creating bucket {} in {}", name, region);
        let creation = self
            .storage
            .create_bucket(name, region)
            .await
            .map_err(|e| {
                error_table::report(&e);
                CloudError::step(Step::CreateBucket, e)
            })?;

        let existed = match creation {
            BucketCreation::Created => {
                tracing::info!("Created bucket {}", name);
                false
            }
            BucketCreation::OwnedByCaller => {
                tracing::info!("Bucket {} already exists in this account", name);
                true
            }
            BucketCreation::OwnedByOther => {
                return Err(CloudError::BucketNameTaken(name.to_string()));
            }
        };

        Ok(ProvisionedBucket {
            name: name.to_string(),
            region: region.to_string(),
            existed,
        })
    }

    /// Apply the public-read policy
    pub async fn make_public(&self, bucket: ProvisionedBucket) -> Result<PublicBucket> {
        let fail = |e| {
            error_table::report(&e);
            CloudError::step(Step::MakePublic, e)
        };

        self.storage
            .allow_public_policy(&bucket.name)
            .await
            .map_err(fail)?;
        self.storage
            .put_bucket_policy(&bucket.name, &public_read_policy(&bucket.name))
            .await
            .map_err(fail)?;

        tracing::info!("Bucket {} is publicly readable", bucket.name);
        Ok(PublicBucket(bucket))
    }

    /// Turn on static website hosting with `index.html` as the index document
    pub async fn enable_web_hosting(&self, bucket: PublicBucket) -> Result<WebsiteBucket> {
        let bucket = bucket.0;
        self.storage
            .put_bucket_website(&bucket.name, INDEX_DOCUMENT)
            .await
            .map_err(|e| {
                error_table::report(&e);
                CloudError::step(Step::EnableWebHosting, e)
            })?;

        let endpoint = bucket.website_endpoint();
        tracing::info!("Website hosting enabled: http://{}", endpoint);
        Ok(WebsiteBucket { bucket, endpoint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Call, FakeCloud};
    use crate::provider::{ProviderError, Service};

    #[test]
    fn test_website_endpoint_forms() {
        assert_eq!(
            website_endpoint("site", "us-west-2"),
            "site.s3-website-us-west-2.amazonaws.com"
        );
        assert_eq!(
            website_endpoint("site", "eu-central-1"),
            "site.s3-website.eu-central-1.amazonaws.com"
        );
    }

    #[test]
    fn test_public_read_policy() {
        let policy: serde_json::Value =
            serde_json::from_str(&public_read_policy("example-site")).unwrap();
        assert_eq!(policy["Version"], "2008-10-17");
        let statement = &policy["Statement"][0];
        assert_eq!(statement["Sid"], "PublicReadGetObject");
        assert_eq!(statement["Principal"]["AWS"], "*");
        assert_eq!(statement["Action"], "s3:GetObject");
        assert_eq!(statement["Resource"], "arn:aws:s3:::example-site/*");
    }

    #[tokio::test]
    async fn test_create_then_retrieve() {
        let cloud = FakeCloud::new();
        let provisioner = BucketProvisioner::new(cloud.storage());

        let first = provisioner
            .create_or_retrieve("example-site", "us-west-2")
            .await
            .unwrap();
        assert!(!first.existed);

        let second = provisioner
            .create_or_retrieve("example-site", "us-west-2")
            .await
            .unwrap();
        assert!(second.existed);
    }

    #[tokio::test]
    async fn test_name_owned_by_other_is_fatal() {
        let cloud = FakeCloud::new().with_foreign_bucket("taken");
        let provisioner = BucketProvisioner::new(cloud.storage());

        let err = provisioner
            .create_or_retrieve("taken", "us-west-2")
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::BucketNameTaken(ref n) if n == "taken"));
    }

    #[tokio::test]
    async fn test_other_create_error_is_fatal() {
        let cloud = FakeCloud::new().fail_on(
            "create_bucket",
            ProviderError::coded(Service::ObjectStorage, "InvalidBucketName", "bad name"),
        );
        let provisioner = BucketProvisioner::new(cloud.storage());

        let err = provisioner
            .create_or_retrieve("Bad_Name", "us-west-2")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CloudError::StepFailed {
                step: Step::CreateBucket,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_make_public_and_enable_hosting() {
        let cloud = FakeCloud::new();
        let provisioner = BucketProvisioner::new(cloud.storage());

        let bucket = provisioner
            .create_or_retrieve("example-site", "us-west-2")
            .await
            .unwrap();
        let public = provisioner.make_public(bucket).await.unwrap();
        let website = provisioner.enable_web_hosting(public).await.unwrap();

        assert_eq!(
            website.endpoint,
            "example-site.s3-website-us-west-2.amazonaws.com"
        );
        assert_eq!(
            cloud.calls(),
            vec![
                Call::CreateBucket("example-site".into()),
                Call::AllowPublicPolicy("example-site".into()),
                Call::PutBucketPolicy("example-site".into()),
                Call::PutBucketWebsite("example-site".into(), "index.html".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_policy_failure_stops_before_hosting() {
        let cloud = FakeCloud::new().fail_on(
            "put_bucket_policy",
            ProviderError::coded(Service::ObjectStorage, "AccessDenied", "denied"),
        );
        let provisioner = BucketProvisioner::new(cloud.storage());

        let bucket = provisioner
            .create_or_retrieve("example-site", "us-west-2")
            .await
            .unwrap();
        let err = provisioner.make_public(bucket).await.unwrap_err();
        assert!(matches!(
            err,
            CloudError::StepFailed {
                step: Step::MakePublic,
                ..
            }
        ));
        assert!(
            !cloud
                .calls()
                .iter()
                .any(|c| matches!(c, Call::PutBucketWebsite(..)))
        );
    }
}
