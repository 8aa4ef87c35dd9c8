//! Cloud provider capability traits
//!
//! Each remote service the pipeline talks to is modelled as a small async
//! trait. Provisioners hold an `Arc<dyn Trait>` and never see the SDK, so a
//! recording fake can stand in for the real client in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Remote service a provider error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    ObjectStorage,
    Certificates,
    Cdn,
    Dns,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::ObjectStorage => write!(f, "s3"),
            Service::Certificates => write!(f, "acm"),
            Service::Cdn => write!(f, "cloudfront"),
            Service::Dns => write!(f, "route53"),
        }
    }
}

/// Error reported by a remote service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub service: Service,
    /// Provider error code (e.g. `BucketAlreadyExists`), if the provider sent one
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(service: Service, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            service,
            code,
            message: message.into(),
        }
    }

    pub fn coded(service: Service, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(service, Some(code.into()), message)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}: {}", self.service, code, self.message),
            None => write!(f, "{}: {}", self.service, self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Outcome of a create-bucket call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCreation {
    /// Fresh bucket created by this call
    Created,
    /// Bucket already exists and belongs to the caller
    OwnedByCaller,
    /// Bucket name is taken by another account
    OwnedByOther,
}

/// A single object upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    /// Local file streamed as the object body
    pub path: PathBuf,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
}

/// Object storage (S3)
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn create_bucket(&self, name: &str, region: &str) -> ProviderResult<BucketCreation>;

    /// Lift the public-access block so a public bucket policy is accepted
    async fn allow_public_policy(&self, name: &str) -> ProviderResult<()>;

    async fn put_bucket_policy(&self, name: &str, policy: &str) -> ProviderResult<()>;

    async fn put_bucket_website(&self, name: &str, index_suffix: &str) -> ProviderResult<()>;

    async fn put_object(&self, object: PutObject) -> ProviderResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMethod {
    Dns,
    Email,
}

/// Certificate issuance request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    pub domain_name: String,
    pub subject_alternative_names: Vec<String>,
    pub validation_method: ValidationMethod,
}

/// DNS record proving domain ownership to the certificate authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub name: String,
    pub record_type: String,
    pub value: String,
}

/// One domain-validation option of a certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainValidation {
    pub domain_name: String,
    /// Absent until the provider has generated it
    pub record: Option<ValidationRecord>,
}

/// Issuance state of a requested certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateStatus {
    PendingValidation,
    Issued,
    /// Failed, expired, revoked or otherwise unusable; carries the provider's status
    Unusable(String),
}

/// Certificate authority (ACM)
#[async_trait]
pub trait CertificateAuthority: Send + Sync {
    /// Returns the certificate ARN
    async fn request_certificate(&self, request: &CertificateRequest) -> ProviderResult<String>;

    async fn describe_certificate(&self, arn: &str) -> ProviderResult<Vec<DomainValidation>>;

    async fn certificate_status(&self, arn: &str) -> ProviderResult<CertificateStatus>;

    /// ARN of a pending or issued certificate whose primary name is `domain_name`
    async fn find_certificate(&self, domain_name: &str) -> ProviderResult<Option<String>>;
}

/// Distribution origin backed by a custom (website) endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginSpec {
    pub id: String,
    pub domain_name: String,
    pub http_port: i32,
    pub https_port: i32,
    pub protocol_policy: String,
}

/// Everything needed to create a CDN distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionSpec {
    pub caller_reference: String,
    pub comment: String,
    pub aliases: Vec<String>,
    pub origin: OriginSpec,
    pub viewer_protocol_policy: String,
    pub forward_query_string: bool,
    pub forward_cookies: String,
    pub min_ttl: i64,
    pub trusted_signers_enabled: bool,
    pub certificate_arn: Option<String>,
    pub minimum_protocol_version: String,
}

/// Existing distribution found by a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionSummary {
    pub id: String,
    pub domain_name: String,
    pub aliases: Vec<String>,
}

/// CDN (CloudFront)
#[async_trait]
pub trait CdnService: Send + Sync {
    /// Returns the provider-assigned distribution domain name
    async fn create_distribution(&self, spec: &DistributionSpec) -> ProviderResult<String>;

    async fn find_distribution_by_alias(
        &self,
        alias: &str,
    ) -> ProviderResult<Option<DistributionSummary>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Create,
    Upsert,
    Delete,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Create => write!(f, "CREATE"),
            ChangeAction::Upsert => write!(f, "UPSERT"),
            ChangeAction::Delete => write!(f, "DELETE"),
        }
    }
}

/// What a record set resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordTarget {
    /// Plain resource records with a TTL
    Values { ttl: i64, values: Vec<String> },
    /// Zone-apex capable alias to another AWS resource
    Alias {
        dns_name: String,
        hosted_zone_id: String,
        evaluate_target_health: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub name: String,
    pub record_type: String,
    pub target: RecordTarget,
}

/// DNS (Route 53)
#[async_trait]
pub trait DnsService: Send + Sync {
    /// Apply all changes as one batch
    async fn change_resource_record_sets(
        &self,
        hosted_zone_id: &str,
        changes: &[RecordChange],
    ) -> ProviderResult<()>;
}
