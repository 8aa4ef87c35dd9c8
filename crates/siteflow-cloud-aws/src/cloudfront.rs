//! CloudFront CDN

use crate::error::{build_error, provider_error};
use async_trait::async_trait;
use aws_sdk_cloudfront::Client;
use aws_sdk_cloudfront::types::{
    Aliases, CookiePreference, CustomOriginConfig, DefaultCacheBehavior, DistributionConfig,
    ForwardedValues, ItemSelection, MinimumProtocolVersion, Origin, OriginProtocolPolicy, Origins,
    SslSupportMethod, TrustedSigners, ViewerCertificate, ViewerProtocolPolicy,
};
use siteflow_cloud::Service;
use siteflow_cloud::provider::{
    CdnService, DistributionSpec, DistributionSummary, ProviderError, ProviderResult,
};

pub struct CloudFrontCdn {
    client: Client,
}

impl CloudFrontCdn {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Translate a distribution spec into the SDK request body
pub fn distribution_config(spec: &DistributionSpec) -> ProviderResult<DistributionConfig> {
    let invalid = |e| build_error(Service::Cdn, e);

    let origin = Origin::builder()
        .id(&spec.origin.id)
        .domain_name(&spec.origin.domain_name)
        .custom_origin_config(
            CustomOriginConfig::builder()
                .http_port(spec.origin.http_port)
                .https_port(spec.origin.https_port)
                .origin_protocol_policy(OriginProtocolPolicy::from(
                    spec.origin.protocol_policy.as_str(),
                ))
                .build()
                .map_err(invalid)?,
        )
        .build()
        .map_err(invalid)?;
    let origins = Origins::builder()
        .quantity(1)
        .items(origin)
        .build()
        .map_err(invalid)?;

    let forwarded_values = ForwardedValues::builder()
        .query_string(spec.forward_query_string)
        .cookies(
            CookiePreference::builder()
                .forward(ItemSelection::from(spec.forward_cookies.as_str()))
                .build()
                .map_err(invalid)?,
        )
        .build()
        .map_err(invalid)?;
    let trusted_signers = TrustedSigners::builder()
        .enabled(spec.trusted_signers_enabled)
        .quantity(0)
        .build()
        .map_err(invalid)?;
    let cache_behavior = DefaultCacheBehavior::builder()
        .target_origin_id(&spec.origin.id)
        .viewer_protocol_policy(ViewerProtocolPolicy::from(
            spec.viewer_protocol_policy.as_str(),
        ))
        .forwarded_values(forwarded_values)
        .min_ttl(spec.min_ttl)
        .trusted_signers(trusted_signers)
        .build()
        .map_err(invalid)?;

    let aliases = Aliases::builder()
        .quantity(spec.aliases.len() as i32)
        .set_items(Some(spec.aliases.clone()))
        .build()
        .map_err(invalid)?;

    let mut config = DistributionConfig::builder()
        .caller_reference(&spec.caller_reference)
        .comment(&spec.comment)
        .enabled(true)
        .aliases(aliases)
        .origins(origins)
        .default_cache_behavior(cache_behavior);

    if let Some(arn) = &spec.certificate_arn {
        config = config.viewer_certificate(
            ViewerCertificate::builder()
                .acm_certificate_arn(arn)
                .ssl_support_method(SslSupportMethod::SniOnly)
                .minimum_protocol_version(MinimumProtocolVersion::from(
                    spec.minimum_protocol_version.as_str(),
                ))
                .build(),
        );
    }

    config.build().map_err(invalid)
}

#[async_trait]
impl CdnService for CloudFrontCdn {
    async fn create_distribution(&self, spec: &DistributionSpec) -> ProviderResult<String> {
        let output = self
            .client
            .create_distribution()
            .distribution_config(distribution_config(spec)?)
            .send()
            .await
            .map_err(|e| provider_error(Service::Cdn, e))?;

        output
            .distribution()
            .map(|d| d.domain_name().to_string())
            .ok_or_else(|| ProviderError::new(Service::Cdn, None, "response carried no distribution"))
    }

    async fn find_distribution_by_alias(
        &self,
        alias: &str,
    ) -> ProviderResult<Option<DistributionSummary>> {
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .client
                .list_distributions()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| provider_error(Service::Cdn, e))?;

            let Some(list) = output.distribution_list() else {
                return Ok(None);
            };

            for summary in list.items() {
                let aliases = summary
                    .aliases()
                    .map(|a| a.items().to_vec())
                    .unwrap_or_default();
                if aliases.iter().any(|a| a == alias) {
                    return Ok(Some(DistributionSummary {
                        id: summary.id().to_string(),
                        domain_name: summary.domain_name().to_string(),
                        aliases,
                    }));
                }
            }

            match list.next_marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteflow_cloud::provider::OriginSpec;

    fn spec(certificate_arn: Option<&str>) -> DistributionSpec {
        DistributionSpec {
            caller_reference: "20240101000000000000000".into(),
            comment: "Cloudfront for example.com".into(),
            aliases: vec!["example.com".into(), "www.example.com".into()],
            origin: OriginSpec {
                id: "S3-Website-example-site.s3-website-us-west-2.amazonaws.com".into(),
                domain_name: "example-site.s3-website-us-west-2.amazonaws.com".into(),
                http_port: 80,
                https_port: 443,
                protocol_policy: "http-only".into(),
            },
            viewer_protocol_policy: "redirect-to-https".into(),
            forward_query_string: false,
            forward_cookies: "none".into(),
            min_ttl: 0,
            trusted_signers_enabled: false,
            certificate_arn: certificate_arn.map(str::to_string),
            minimum_protocol_version: "TLSv1.2_2021".into(),
        }
    }

    #[test]
    fn test_distribution_config() {
        let config = distribution_config(&spec(None)).unwrap();

        assert_eq!(config.comment(), "Cloudfront for example.com");
        let aliases = config.aliases().unwrap();
        assert_eq!(aliases.items(), ["example.com", "www.example.com"]);

        let origin = &config.origins().unwrap().items()[0];
        assert_eq!(
            origin.domain_name(),
            "example-site.s3-website-us-west-2.amazonaws.com"
        );
        assert_eq!(
            origin.custom_origin_config().unwrap().origin_protocol_policy(),
            &OriginProtocolPolicy::HttpOnly
        );

        let behavior = config.default_cache_behavior().unwrap();
        assert_eq!(behavior.target_origin_id(), origin.id());
        assert_eq!(
            behavior.viewer_protocol_policy(),
            &ViewerProtocolPolicy::RedirectToHttps
        );
        assert_eq!(behavior.min_ttl(), Some(0));
        assert!(config.viewer_certificate().is_none());
    }

    #[test]
    fn test_distribution_config_attaches_certificate() {
        let arn = "arn:aws:acm:us-east-1:123456789012:certificate/abc";
        let config = distribution_config(&spec(Some(arn))).unwrap();

        let certificate = config.viewer_certificate().unwrap();
        assert_eq!(certificate.acm_certificate_arn(), Some(arn));
        assert_eq!(certificate.ssl_support_method(), Some(&SslSupportMethod::SniOnly));
        assert_eq!(
            certificate.minimum_protocol_version().map(|v| v.as_str()),
            Some("TLSv1.2_2021")
        );
    }
}
