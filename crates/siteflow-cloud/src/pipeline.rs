//! Deployment pipeline
//!
//! Provisioning is a strict chain, each stage consuming the value produced
//! by the one before it:
//!
//! ```text
//! ProvisionedBucket ─┬─ RequestedCertificate ─ ValidatedCertificate ─ (validation record)
//!                    └─ PublicBucket ─ WebsiteBucket ─┬─ (issued) ─ Distribution ─ (alias records)
//! ```
//!
//! A bucket that already belongs to the caller means an earlier run got at
//! least that far. With probing on, an existing distribution for the domain
//! confirms the earlier run reached its last step, and the alias records are
//! re-asserted. Otherwise the chain runs again, reusing the certificate the
//! earlier run requested.

use crate::bucket::{BucketProvisioner, ProvisionedBucket};
use crate::certificate::{CertificateProvisioner, RequestedCertificate};
use crate::distribution::{Distribution, DistributionProvisioner};
use crate::dns::DnsRecordManager;
use crate::error::{CloudError, Result};
use crate::provider::{CdnService, CertificateAuthority, DnsService, ObjectStorage};
use crate::upload::{DirectoryUploader, UploadReport};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Service clients shared by every stage of a run
#[derive(Clone)]
pub struct CloudClients {
    pub storage: Arc<dyn ObjectStorage>,
    pub certificates: Arc<dyn CertificateAuthority>,
    pub cdn: Arc<dyn CdnService>,
    pub dns: Arc<dyn DnsService>,
}

/// What to deploy and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployTarget {
    pub bucket: String,
    pub domain: String,
    pub hosted_zone_id: String,
    pub region: String,
    /// Prepended to every uploaded key
    #[serde(default)]
    pub prefix: String,
    /// Confirm an existing bucket really finished provisioning
    #[serde(default = "default_probe")]
    pub probe_existing: bool,
}

fn default_probe() -> bool {
    true
}

impl DeployTarget {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("bucket", &self.bucket),
            ("domain", &self.domain),
            ("hosted_zone_id", &self.hosted_zone_id),
            ("region", &self.region),
        ] {
            if value.trim().is_empty() {
                return Err(CloudError::InvalidConfig(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

/// How the provisioning phase ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProvisionOutcome {
    /// First deploy; every resource was created
    Provisioned { distribution_domain: String },
    /// Bucket existed but no distribution did; the chain ran again
    Resumed { distribution_domain: String },
    /// Bucket and distribution both exist; alias records were refreshed
    AlreadyProvisioned { distribution_domain: String },
    /// Bucket existed and probing is off
    Skipped,
}

impl ProvisionOutcome {
    pub fn distribution_domain(&self) -> Option<&str> {
        match self {
            ProvisionOutcome::Provisioned {
                distribution_domain,
            }
            | ProvisionOutcome::Resumed {
                distribution_domain,
            }
            | ProvisionOutcome::AlreadyProvisioned {
                distribution_domain,
            } => Some(distribution_domain),
            ProvisionOutcome::Skipped => None,
        }
    }
}

impl std::fmt::Display for ProvisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvisionOutcome::Provisioned { .. } => write!(f, "provisioned"),
            ProvisionOutcome::Resumed { .. } => write!(f, "resumed"),
            ProvisionOutcome::AlreadyProvisioned { .. } => write!(f, "already provisioned"),
            ProvisionOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployReport {
    pub provisioning: ProvisionOutcome,
    pub upload: UploadReport,
    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

pub struct DeployPipeline {
    buckets: BucketProvisioner,
    certificates: CertificateProvisioner,
    distributions: DistributionProvisioner,
    dns: DnsRecordManager,
    uploader: DirectoryUploader,
}

impl DeployPipeline {
    pub fn new(clients: CloudClients) -> Self {
        Self {
            buckets: BucketProvisioner::new(clients.storage.clone()),
            certificates: CertificateProvisioner::new(clients.certificates),
            distributions: DistributionProvisioner::new(clients.cdn),
            dns: DnsRecordManager::new(clients.dns),
            uploader: DirectoryUploader::new(clients.storage),
        }
    }

    /// Override the wait after a certificate request
    pub fn with_propagation_delay(mut self, delay: Duration) -> Self {
        self.certificates = self.certificates.with_propagation_delay(delay);
        self
    }

    /// Override how long to wait for the certificate to be issued
    pub fn with_issuance_timeout(mut self, timeout: Duration) -> Self {
        self.certificates = self.certificates.with_issuance_timeout(timeout);
        self
    }

    /// Provision, then upload `site_root`
    pub async fn run(&self, target: &DeployTarget, site_root: &Path) -> Result<DeployReport> {
        let start = Instant::now();
        target.validate()?;
        if !site_root.is_dir() {
            return Err(CloudError::SiteDirNotFound(site_root.to_path_buf()));
        }

        let provisioning = self.provision(target).await?;
        let upload = self
            .uploader
            .upload_directory(&target.bucket, &target.prefix, site_root)
            .await?;

        Ok(DeployReport {
            provisioning,
            upload,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Upload `site_root` without touching any other resource
    pub async fn upload_only(&self, target: &DeployTarget, site_root: &Path) -> Result<UploadReport> {
        target.validate()?;
        self.uploader
            .upload_directory(&target.bucket, &target.prefix, site_root)
            .await
    }

    pub async fn provision(&self, target: &DeployTarget) -> Result<ProvisionOutcome> {
        let bucket = self
            .buckets
            .create_or_retrieve(&target.bucket, &target.region)
            .await?;

        if !bucket.existed {
            let requested = self.certificates.request(&target.domain).await?;
            let distribution = self.provision_chain(target, bucket, requested).await?;
            return Ok(ProvisionOutcome::Provisioned {
                distribution_domain: distribution.domain_name,
            });
        }

        if !target.probe_existing {
            tracing::info!("Bucket {} exists, skipping provisioning", target.bucket);
            return Ok(ProvisionOutcome::Skipped);
        }

        if let Some(existing) = self.distributions.probe(&target.domain).await? {
            tracing::info!(
                "{} is already served by {}",
                target.domain,
                existing.domain_name
            );
            // An earlier run may have stopped right after creating the distribution
            self.dns
                .upsert_alias_records(&target.hosted_zone_id, &target.domain, &existing)
                .await?;
            return Ok(ProvisionOutcome::AlreadyProvisioned {
                distribution_domain: existing.domain_name,
            });
        }

        tracing::warn!(
            "Bucket {} exists but no distribution serves {}; resuming provisioning",
            target.bucket,
            target.domain
        );
        let requested = self.certificates.reuse_or_request(&target.domain).await?;
        let distribution = self.provision_chain(target, bucket, requested).await?;
        Ok(ProvisionOutcome::Resumed {
            distribution_domain: distribution.domain_name,
        })
    }

    async fn provision_chain(
        &self,
        target: &DeployTarget,
        bucket: ProvisionedBucket,
        requested: RequestedCertificate,
    ) -> Result<Distribution> {
        let certificate = self.certificates.describe(requested).await?;
        self.dns
            .upsert_validation_record(&target.hosted_zone_id, &certificate.validation_record)
            .await?;

        let public = self.buckets.make_public(bucket).await?;
        let website = self.buckets.enable_web_hosting(public).await?;

        self.certificates.wait_until_issued(&certificate).await?;
        let distribution = self
            .distributions
            .create(&website, &certificate, &target.domain)
            .await?;
        self.dns
            .upsert_alias_records(&target.hosted_zone_id, &target.domain, &distribution)
            .await?;

        Ok(distribution)
    }
}
