//! TLS certificate provisioning

use crate::error::{CloudError, Result, Step};
use crate::error_table;
use crate::provider::{
    CertificateAuthority, CertificateRequest, CertificateStatus, ValidationMethod, ValidationRecord,
};
use std::sync::Arc;
use std::time::Duration;

/// Wait between the request and the first describe call; validation
/// options are not queryable before then
pub const DEFAULT_PROPAGATION_DELAY: Duration = Duration::from_secs(8);

/// How long to wait for DNS validation before giving up
pub const DEFAULT_ISSUANCE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub const ISSUANCE_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Certificate requested, validation record not yet fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedCertificate {
    pub domain_name: String,
    pub arn: String,
}

/// Certificate with its DNS validation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCertificate {
    pub domain_name: String,
    pub arn: String,
    pub validation_record: ValidationRecord,
}

pub struct CertificateProvisioner {
    authority: Arc<dyn CertificateAuthority>,
    propagation_delay: Duration,
    issuance_timeout: Duration,
}

fn primary_name(domain: &str) -> String {
    format!("*.{domain}")
}

impl CertificateProvisioner {
    pub fn new(authority: Arc<dyn CertificateAuthority>) -> Self {
        Self {
            authority,
            propagation_delay: DEFAULT_PROPAGATION_DELAY,
            issuance_timeout: DEFAULT_ISSUANCE_TIMEOUT,
        }
    }

    pub fn with_propagation_delay(mut self, delay: Duration) -> Self {
        self.propagation_delay = delay;
        self
    }

    pub fn with_issuance_timeout(mut self, timeout: Duration) -> Self {
        self.issuance_timeout = timeout;
        self
    }

    /// Certificate an earlier run already requested for `domain`
    pub async fn find_existing(&self, domain: &str) -> Result<Option<RequestedCertificate>> {
        let arn = self
            .authority
            .find_certificate(&primary_name(domain))
            .await
            .map_err(|e| {
                error_table::report(&e);
                CloudError::step(Step::FindCertificate, e)
            })?;

        Ok(arn.map(|arn| {
            tracing::info!("Reusing certificate {} for {}", arn, domain);
            RequestedCertificate {
                domain_name: domain.to_string(),
                arn,
            }
        }))
    }

    /// Reuse the certificate for `domain` if there is one, otherwise request it
    pub async fn reuse_or_request(&self, domain: &str) -> Result<RequestedCertificate> {
        match self.find_existing(domain).await? {
            Some(cert) => Ok(cert),
            None => self.request(domain).await,
        }
    }

    /// Request a wildcard certificate for `domain` (with the apex as SAN)
    /// and wait for its validation options to propagate
    pub async fn request(&self, domain: &str) -> Result<RequestedCertificate> {
        let request = CertificateRequest {
            domain_name: primary_name(domain),
            subject_alternative_names: vec![domain.to_string()],
            validation_method: ValidationMethod::Dns,
        };
        tracing::debug!("Requesting certificate for {}", request.domain_name);

        let arn = self
            .authority
            .request_certificate(&request)
            .await
            .map_err(|e| {
                error_table::report(&e);
                CloudError::step(Step::RequestCertificate, e)
            })?;
        tracing::info!("Requested certificate {}", arn);

        if !self.propagation_delay.is_zero() {
            tracing::debug!(
                "Waiting {:?} for validation options of {}",
                self.propagation_delay,
                arn
            );
            tokio::time::sleep(self.propagation_delay).await;
        }

        Ok(RequestedCertificate {
            domain_name: domain.to_string(),
            arn,
        })
    }

    /// Fetch the DNS validation record of the first validation option
    pub async fn describe(&self, cert: RequestedCertificate) -> Result<ValidatedCertificate> {
        let options = self
            .authority
            .describe_certificate(&cert.arn)
            .await
            .map_err(|e| {
                error_table::report(&e);
                CloudError::step(Step::DescribeCertificate, e)
            })?;

        let record = options
            .into_iter()
            .next()
            .and_then(|option| option.record)
            .filter(|r| !r.name.is_empty() && !r.value.is_empty())
            .ok_or_else(|| CloudError::MissingValidationRecord(cert.arn.clone()))?;

        tracing::info!(
            "Validation record for {}: {} {} {}",
            cert.domain_name,
            record.name,
            record.record_type,
            record.value
        );

        Ok(ValidatedCertificate {
            domain_name: cert.domain_name,
            arn: cert.arn,
            validation_record: record,
        })
    }

    /// Poll until the certificate is issued, for at most the issuance timeout
    pub async fn wait_until_issued(&self, cert: &ValidatedCertificate) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.issuance_timeout;
        loop {
            let status = self
                .authority
                .certificate_status(&cert.arn)
                .await
                .map_err(|e| {
                    error_table::report(&e);
                    CloudError::step(Step::AwaitIssuance, e)
                })?;

            match status {
                CertificateStatus::Issued => {
                    tracing::info!("Certificate {} is issued", cert.arn);
                    return Ok(());
                }
                CertificateStatus::Unusable(status) => {
                    return Err(CloudError::CertificateUnusable {
                        arn: cert.arn.clone(),
                        status,
                    });
                }
                CertificateStatus::PendingValidation => {}
            }

            if tokio::time::Instant::now() + ISSUANCE_POLL_INTERVAL > deadline {
                return Err(CloudError::CertificateNotIssued {
                    arn: cert.arn.clone(),
                    waited: self.issuance_timeout,
                });
            }
            tracing::debug!("Certificate {} still pending validation", cert.arn);
            tokio::time::sleep(ISSUANCE_POLL_INTERVAL).await;
        }
    }
}
