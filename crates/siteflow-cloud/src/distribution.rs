//! CloudFront distribution provisioning

use crate::bucket::WebsiteBucket;
use crate::certificate::ValidatedCertificate;
use crate::error::{CloudError, Result, Step};
use crate::error_table;
use crate::provider::{CdnService, DistributionSpec, OriginSpec};
use std::sync::Arc;

pub const VIEWER_PROTOCOL_POLICY: &str = "redirect-to-https";
pub const ORIGIN_PROTOCOL_POLICY: &str = "http-only";
pub const MINIMUM_PROTOCOL_VERSION: &str = "TLSv1.2_2021";

/// Distribution fronting the site bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub alias: String,
    /// Provider-assigned name, e.g. `d111111abcdef8.cloudfront.net`
    pub domain_name: String,
}

/// Distribution configuration for a website bucket served under `alias`
/// and `www.<alias>`
pub fn build_spec(
    website: &WebsiteBucket,
    certificate_arn: Option<&str>,
    alias: &str,
    caller_reference: String,
) -> DistributionSpec {
    DistributionSpec {
        caller_reference,
        comment: format!("Cloudfront for {alias}"),
        aliases: vec![alias.to_string(), format!("www.{alias}")],
        origin: OriginSpec {
            id: format!("S3-Website-{}", website.endpoint),
            domain_name: website.endpoint.clone(),
            http_port: 80,
            https_port: 443,
            protocol_policy: ORIGIN_PROTOCOL_POLICY.to_string(),
        },
        viewer_protocol_policy: VIEWER_PROTOCOL_POLICY.to_string(),
        forward_query_string: false,
        forward_cookies: "none".to_string(),
        min_ttl: 0,
        trusted_signers_enabled: false,
        certificate_arn: certificate_arn.map(str::to_string),
        minimum_protocol_version: MINIMUM_PROTOCOL_VERSION.to_string(),
    }
}

/// Unique per call, satisfies the provider's idempotency key
fn caller_reference() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S%f").to_string()
}

pub struct DistributionProvisioner {
    cdn: Arc<dyn CdnService>,
}

impl DistributionProvisioner {
    pub fn new(cdn: Arc<dyn CdnService>) -> Self {
        Self { cdn }
    }

    pub async fn create(
        &self,
        website: &WebsiteBucket,
        certificate: &ValidatedCertificate,
        alias: &str,
    ) -> Result<Distribution> {
        let spec = build_spec(website, Some(&certificate.arn), alias, caller_reference());
        tracing::debug!(
            "Creating distribution {} -> {}",
            spec.aliases.join(", "),
            spec.origin.domain_name
        );

        let domain_name = self.cdn.create_distribution(&spec).await.map_err(|e| {
            if let Some(known) = error_table::report(&e)
                && known.code == "InvalidViewerCertificate"
            {
                tracing::warn!(
                    "Certificate {} is probably still pending validation; re-run once it is issued",
                    certificate.arn
                );
            }
            CloudError::step(Step::CreateDistribution, e)
        })?;

        tracing::info!("Created distribution {} for {}", domain_name, alias);
        Ok(Distribution {
            alias: alias.to_string(),
            domain_name,
        })
    }

    /// Look for a distribution already serving `alias`
    pub async fn probe(&self, alias: &str) -> Result<Option<Distribution>> {
        let found = self
            .cdn
            .find_distribution_by_alias(alias)
            .await
            .map_err(|e| {
                error_table::report(&e);
                CloudError::step(Step::ProbeDistribution, e)
            })?;

        Ok(found.map(|summary| {
            tracing::debug!("Distribution {} serves {}", summary.id, alias);
            Distribution {
                alias: alias.to_string(),
                domain_name: summary.domain_name,
            }
        }))
    }
}
