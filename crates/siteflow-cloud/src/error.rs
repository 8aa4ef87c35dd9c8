//! Deployment error types

use crate::provider::{ProviderError, Service};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Provisioning step that issued a failing provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateBucket,
    RequestCertificate,
    DescribeCertificate,
    UpsertValidationRecord,
    MakePublic,
    EnableWebHosting,
    FindCertificate,
    AwaitIssuance,
    CreateDistribution,
    UpsertAliasRecords,
    ProbeDistribution,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::CreateBucket => write!(f, "create bucket"),
            Step::RequestCertificate => write!(f, "request certificate"),
            Step::DescribeCertificate => write!(f, "describe certificate"),
            Step::UpsertValidationRecord => write!(f, "upsert validation record"),
            Step::MakePublic => write!(f, "make bucket public"),
            Step::EnableWebHosting => write!(f, "enable website hosting"),
            Step::FindCertificate => write!(f, "find existing certificate"),
            Step::AwaitIssuance => write!(f, "wait for certificate issuance"),
            Step::CreateDistribution => write!(f, "create distribution"),
            Step::UpsertAliasRecords => write!(f, "upsert alias records"),
            Step::ProbeDistribution => write!(f, "probe existing distribution"),
        }
    }
}

/// Fatal deployment errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Bucket {0} already exists and is owned by another account. Please choose a different name")]
    BucketNameTaken(String),

    #[error("{step} failed: {source}")]
    StepFailed {
        step: Step,
        #[source]
        source: ProviderError,
    },

    #[error("Certificate {0} has no DNS validation record yet")]
    MissingValidationRecord(String),

    #[error("Certificate {arn} was not issued within {waited:?}; check the validation record and re-run")]
    CertificateNotIssued { arn: String, waited: Duration },

    #[error("Certificate {arn} cannot be used (status {status})")]
    CertificateUnusable { arn: String, status: String },

    #[error("Refusing to upsert DNS record {0} with an empty value")]
    EmptyRecord(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Site directory not found: {0}")]
    SiteDirNotFound(PathBuf),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CloudError {
    pub fn step(step: Step, source: ProviderError) -> Self {
        CloudError::StepFailed { step, source }
    }

    /// Service whose call failed, if the error came from a provider
    pub fn service(&self) -> Option<Service> {
        match self {
            CloudError::StepFailed { source, .. } => Some(source.service),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Per-file upload failure; logged and recorded, never fatal
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
