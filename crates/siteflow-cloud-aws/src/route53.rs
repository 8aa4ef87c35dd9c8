//! Route 53 DNS

use crate::error::{build_error, provider_error};
use async_trait::async_trait;
use aws_sdk_route53::Client;
use aws_sdk_route53::types::{
    AliasTarget, Change, ChangeAction as SdkAction, ChangeBatch, ResourceRecord,
    ResourceRecordSet, RrType,
};
use siteflow_cloud::Service;
use siteflow_cloud::provider::{
    ChangeAction, DnsService, ProviderResult, RecordChange, RecordTarget,
};

pub struct Route53Dns {
    client: Client,
}

impl Route53Dns {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn sdk_action(action: ChangeAction) -> SdkAction {
    match action {
        ChangeAction::Create => SdkAction::Create,
        ChangeAction::Upsert => SdkAction::Upsert,
        ChangeAction::Delete => SdkAction::Delete,
    }
}

/// Translate one record change into the SDK form
pub fn sdk_change(change: &RecordChange) -> ProviderResult<Change> {
    let invalid = |e| build_error(Service::Dns, e);

    let mut record_set = ResourceRecordSet::builder()
        .name(&change.name)
        .r#type(RrType::from(change.record_type.as_str()));

    record_set = match &change.target {
        RecordTarget::Values { ttl, values } => {
            let records = values
                .iter()
                .map(|v| ResourceRecord::builder().value(v).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(invalid)?;
            record_set.ttl(*ttl).set_resource_records(Some(records))
        }
        RecordTarget::Alias {
            dns_name,
            hosted_zone_id,
            evaluate_target_health,
        } => record_set.alias_target(
            AliasTarget::builder()
                .hosted_zone_id(hosted_zone_id)
                .dns_name(dns_name)
                .evaluate_target_health(*evaluate_target_health)
                .build()
                .map_err(invalid)?,
        ),
    };

    Change::builder()
        .action(sdk_action(change.action))
        .resource_record_set(record_set.build().map_err(invalid)?)
        .build()
        .map_err(invalid)
}

#[async_trait]
impl DnsService for Route53Dns {
    async fn change_resource_record_sets(
        &self,
        hosted_zone_id: &str,
        changes: &[RecordChange],
    ) -> ProviderResult<()> {
        let changes = changes
            .iter()
            .map(sdk_change)
            .collect::<ProviderResult<Vec<_>>>()?;
        let batch = ChangeBatch::builder()
            .set_changes(Some(changes))
            .build()
            .map_err(|e| build_error(Service::Dns, e))?;

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(hosted_zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| provider_error(Service::Dns, e))?;

        if let Some(info) = output.change_info() {
            tracing::debug!("Route 53 change {} is {}", info.id(), info.status().as_str());
        }
        Ok(())
    }
}
