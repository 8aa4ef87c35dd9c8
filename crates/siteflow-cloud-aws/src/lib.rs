//! SiteFlow AWS Provider
//!
//! Implements the `siteflow-cloud` provider traits on top of the AWS SDK:
//!
//! - **S3**: bucket creation, public-read policy, website hosting, uploads
//! - **ACM**: wildcard certificate requests (always in `us-east-1`)
//! - **CloudFront**: distribution creation and alias lookup
//! - **Route 53**: record set changes
//!
//! SDK errors are translated into `ProviderError` with the service error
//! code preserved, so the error tables in `siteflow-cloud` can classify them.

pub mod acm;
pub mod cloudfront;
pub mod error;
pub mod route53;
pub mod s3;
pub mod session;

pub use acm::AcmCertificates;
pub use cloudfront::CloudFrontCdn;
pub use error::{AwsError, Result};
pub use route53::Route53Dns;
pub use s3::S3Storage;
pub use session::{AwsCredentials, AwsSession, CERTIFICATE_REGION};
