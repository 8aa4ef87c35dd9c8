//! Authenticated AWS session
//!
//! One `SdkConfig` built from static credentials and the deployment region
//! is shared read-only by every service client of a run.

use crate::acm::AcmCertificates;
use crate::cloudfront::CloudFrontCdn;
use crate::error::{AwsError, Result};
use crate::route53::Route53Dns;
use crate::s3::S3Storage;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use siteflow_cloud::CloudClients;
use std::sync::Arc;

/// Region CloudFront reads viewer certificates from
pub const CERTIFICATE_REGION: &str = "us-east-1";

const PROVIDER_NAME: &str = "siteflow-config";

#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}

pub struct AwsSession {
    config: SdkConfig,
}

impl AwsSession {
    pub async fn new(region: &str, credentials: AwsCredentials) -> Result<Self> {
        if region.trim().is_empty() || region.contains(char::is_whitespace) {
            return Err(AwsError::InvalidRegion(region.to_string()));
        }
        if credentials.access_key_id.is_empty() {
            return Err(AwsError::MissingCredentials("access key id"));
        }
        if credentials.secret_access_key.is_empty() {
            return Err(AwsError::MissingCredentials("secret access key"));
        }

        let provider = Credentials::new(
            credentials.access_key_id,
            credentials.secret_access_key,
            None,
            None,
            PROVIDER_NAME,
        );
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(provider)
            .load()
            .await;

        tracing::debug!("AWS session ready for {}", region);
        Ok(Self { config })
    }

    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|r| r.as_ref())
    }

    pub fn s3(&self) -> S3Storage {
        S3Storage::new(aws_sdk_s3::Client::new(&self.config))
    }

    /// ACM client pinned to the certificate region
    pub fn acm(&self) -> AcmCertificates {
        let config = aws_sdk_acm::config::Builder::from(&self.config)
            .region(Region::new(CERTIFICATE_REGION))
            .build();
        AcmCertificates::new(aws_sdk_acm::Client::from_conf(config))
    }

    pub fn cloudfront(&self) -> CloudFrontCdn {
        CloudFrontCdn::new(aws_sdk_cloudfront::Client::new(&self.config))
    }

    pub fn route53(&self) -> Route53Dns {
        Route53Dns::new(aws_sdk_route53::Client::new(&self.config))
    }

    /// All four provider clients, ready for the deploy pipeline
    pub fn clients(&self) -> CloudClients {
        CloudClients {
            storage: Arc::new(self.s3()),
            certificates: Arc::new(self.acm()),
            cdn: Arc::new(self.cloudfront()),
            dns: Arc::new(self.route53()),
        }
    }
}
