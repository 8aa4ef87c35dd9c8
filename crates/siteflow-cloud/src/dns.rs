//! Route 53 record management

use crate::distribution::Distribution;
use crate::error::{CloudError, Result, Step};
use crate::error_table;
use crate::provider::{ChangeAction, DnsService, RecordChange, RecordTarget, ValidationRecord};
use std::sync::Arc;

/// Hosted zone id every CloudFront alias target lives in
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// TTL for the validation and `www.` records
pub const RECORD_TTL: i64 = 60;

/// Validation record as an UPSERT change
pub fn validation_change(record: &ValidationRecord) -> RecordChange {
    RecordChange {
        action: ChangeAction::Upsert,
        name: record.name.clone(),
        record_type: record.record_type.clone(),
        target: RecordTarget::Values {
            ttl: RECORD_TTL,
            values: vec![record.value.clone()],
        },
    }
}

/// `www.` CNAME plus apex alias, both pointing at the distribution
pub fn alias_changes(domain: &str, distribution_domain: &str) -> [RecordChange; 2] {
    [
        RecordChange {
            action: ChangeAction::Upsert,
            name: format!("www.{domain}"),
            record_type: "CNAME".to_string(),
            target: RecordTarget::Values {
                ttl: RECORD_TTL,
                values: vec![distribution_domain.to_string()],
            },
        },
        RecordChange {
            action: ChangeAction::Upsert,
            name: domain.to_string(),
            record_type: "A".to_string(),
            target: RecordTarget::Alias {
                dns_name: distribution_domain.to_string(),
                hosted_zone_id: CLOUDFRONT_HOSTED_ZONE_ID.to_string(),
                evaluate_target_health: false,
            },
        },
    ]
}

pub struct DnsRecordManager {
    dns: Arc<dyn DnsService>,
}

impl DnsRecordManager {
    pub fn new(dns: Arc<dyn DnsService>) -> Self {
        Self { dns }
    }

    pub async fn upsert_validation_record(
        &self,
        hosted_zone_id: &str,
        record: &ValidationRecord,
    ) -> Result<()> {
        if record.name.is_empty() || record.value.is_empty() {
            return Err(CloudError::EmptyRecord(record.name.clone()));
        }

        tracing::debug!("UPSERT {} {} in {}", record.name, record.record_type, hosted_zone_id);
        self.dns
            .change_resource_record_sets(hosted_zone_id, &[validation_change(record)])
            .await
            .map_err(|e| {
                error_table::report(&e);
                CloudError::step(Step::UpsertValidationRecord, e)
            })?;

        tracing::info!("Inserted validation record {}", record.name);
        Ok(())
    }

    /// Point `www.<domain>` and `<domain>` at the distribution in one batch
    pub async fn upsert_alias_records(
        &self,
        hosted_zone_id: &str,
        domain: &str,
        distribution: &Distribution,
    ) -> Result<()> {
        let changes = alias_changes(domain, &distribution.domain_name);
        self.dns
            .change_resource_record_sets(hosted_zone_id, &changes)
            .await
            .map_err(|e| {
                error_table::report(&e);
                CloudError::step(Step::UpsertAliasRecords, e)
            })?;

        tracing::info!(
            "{} and www.{} now point at {}",
            domain,
            domain,
            distribution.domain_name
        );
        Ok(())
    }
}
