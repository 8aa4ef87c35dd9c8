//! SiteFlow Cloud Provisioning
//!
//! Provisions everything a static site needs to be served over HTTPS on a
//! custom domain, then mirrors the built site into the bucket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  SiteFlow CLI                    │
//! │             (siteflow deploy/upload)             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               siteflow-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │             DeployPipeline                │   │
//! │  │  bucket → certificate → dns → website     │   │
//! │  │  → issuance → distribution → dns → upload │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  ObjectStorage / CertificateAuthority /   │   │
//! │  │  CdnService / DnsService traits           │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │              siteflow-cloud-aws                  │
//! │        S3 / ACM / CloudFront / Route 53          │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod bucket;
pub mod certificate;
pub mod content_type;
pub mod distribution;
pub mod dns;
pub mod error;
pub mod error_table;
pub mod pipeline;
pub mod provider;
pub mod upload;

#[cfg(test)]
pub(crate) mod fake;

// Re-exports
pub use bucket::{BucketProvisioner, ProvisionedBucket, PublicBucket, WebsiteBucket};
pub use certificate::{CertificateProvisioner, RequestedCertificate, ValidatedCertificate};
pub use distribution::{Distribution, DistributionProvisioner};
pub use dns::DnsRecordManager;
pub use error::{CloudError, Result, Step, UploadError};
pub use error_table::{ErrorTable, KnownError, Severity};
pub use pipeline::{CloudClients, DeployPipeline, DeployReport, DeployTarget, ProvisionOutcome};
pub use provider::{
    BucketCreation, CdnService, CertificateAuthority, CertificateStatus, DnsService, ObjectStorage,
    ProviderError, ProviderResult, Service,
};
pub use upload::{DirectoryUploader, UploadPlan, UploadReport};
