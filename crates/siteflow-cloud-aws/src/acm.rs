//! ACM certificate authority

use crate::error::provider_error;
use async_trait::async_trait;
use aws_sdk_acm::Client;
use aws_sdk_acm::types::{
    CertificateStatus as SdkStatus, CertificateSummary, DomainValidation as SdkDomainValidation,
    ValidationMethod as SdkMethod,
};
use siteflow_cloud::Service;
use siteflow_cloud::provider::{
    CertificateAuthority, CertificateRequest, CertificateStatus, DomainValidation, ProviderError,
    ProviderResult, ValidationMethod, ValidationRecord,
};

pub struct AcmCertificates {
    client: Client,
}

impl AcmCertificates {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn sdk_method(method: ValidationMethod) -> SdkMethod {
    match method {
        ValidationMethod::Dns => SdkMethod::Dns,
        ValidationMethod::Email => SdkMethod::Email,
    }
}

fn domain_validation(option: &SdkDomainValidation) -> DomainValidation {
    DomainValidation {
        domain_name: option.domain_name().to_string(),
        record: option.resource_record().map(|r| ValidationRecord {
            name: r.name().to_string(),
            record_type: r.r#type().as_str().to_string(),
            value: r.value().to_string(),
        }),
    }
}

fn certificate_status(status: Option<&SdkStatus>) -> CertificateStatus {
    match status {
        Some(SdkStatus::Issued) => CertificateStatus::Issued,
        Some(SdkStatus::PendingValidation) | None => CertificateStatus::PendingValidation,
        Some(other) => CertificateStatus::Unusable(other.as_str().to_string()),
    }
}

/// ARN of the first summary whose primary name is `domain_name`
fn matching_arn(summaries: &[CertificateSummary], domain_name: &str) -> Option<String> {
    summaries
        .iter()
        .find(|s| s.domain_name() == Some(domain_name))
        .and_then(|s| s.certificate_arn())
        .map(str::to_string)
}

#[async_trait]
impl CertificateAuthority for AcmCertificates {
    async fn request_certificate(&self, request: &CertificateRequest) -> ProviderResult<String> {
        let output = self
            .client
            .request_certificate()
            .domain_name(&request.domain_name)
            .set_subject_alternative_names(Some(request.subject_alternative_names.clone()))
            .validation_method(sdk_method(request.validation_method))
            .send()
            .await
            .map_err(|e| provider_error(Service::Certificates, e))?;

        output.certificate_arn().map(str::to_string).ok_or_else(|| {
            ProviderError::new(
                Service::Certificates,
                None,
                "response carried no certificate ARN",
            )
        })
    }

    async fn describe_certificate(&self, arn: &str) -> ProviderResult<Vec<DomainValidation>> {
        let output = self
            .client
            .describe_certificate()
            .certificate_arn(arn)
            .send()
            .await
            .map_err(|e| provider_error(Service::Certificates, e))?;

        Ok(output
            .certificate()
            .map(|detail| {
                detail
                    .domain_validation_options()
                    .iter()
                    .map(domain_validation)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn certificate_status(&self, arn: &str) -> ProviderResult<CertificateStatus> {
        let output = self
            .client
            .describe_certificate()
            .certificate_arn(arn)
            .send()
            .await
            .map_err(|e| provider_error(Service::Certificates, e))?;

        Ok(certificate_status(
            output.certificate().and_then(|detail| detail.status()),
        ))
    }

    async fn find_certificate(&self, domain_name: &str) -> ProviderResult<Option<String>> {
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_certificates()
                .certificate_statuses(SdkStatus::PendingValidation)
                .certificate_statuses(SdkStatus::Issued)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| provider_error(Service::Certificates, e))?;

            if let Some(arn) = matching_arn(output.certificate_summary_list(), domain_name) {
                return Ok(Some(arn));
            }
            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => return Ok(None),
            }
        }
    }
}
