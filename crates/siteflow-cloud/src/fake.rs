//! In-memory provider used by the unit tests
//!
//! One `FakeCloud` implements all four provider traits over shared state and
//! records every call in order, so tests can assert on the exact sequence the
//! pipeline issued.

use crate::provider::*;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const FAKE_CERT_ARN: &str = "arn:aws:acm:us-east-1:123456789012:certificate/fake-1";
pub const FAKE_CDN_DOMAIN: &str = "d123.cdn.example.net";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateBucket(String),
    AllowPublicPolicy(String),
    PutBucketPolicy(String),
    PutBucketWebsite(String, String),
    PutObject(String),
    RequestCertificate(String),
    DescribeCertificate(String),
    CertificateStatus(String),
    FindCertificate(String),
    CreateDistribution(Vec<String>),
    FindDistribution(String),
    ChangeRecords(String, Vec<RecordChange>),
}

struct State {
    calls: Vec<Call>,
    buckets: HashSet<String>,
    foreign_buckets: HashSet<String>,
    failures: HashMap<&'static str, ProviderError>,
    failing_keys: HashSet<String>,
    objects: Vec<PutObject>,
    validation_record: Option<ValidationRecord>,
    /// Primary domain name → ARN of certificates requested so far
    certificates: HashMap<String, String>,
    pending_polls: usize,
    certificate_status: CertificateStatus,
    distributions: Vec<DistributionSummary>,
    distribution_specs: Vec<DistributionSpec>,
}

#[derive(Clone)]
pub struct FakeCloud {
    state: Arc<Mutex<State>>,
}

pub fn sample_validation_record() -> ValidationRecord {
    ValidationRecord {
        name: "_3639ac514e785e898d2646601fa951d5.example.com.".to_string(),
        record_type: "CNAME".to_string(),
        value: "_98d2646601fa951d53639ac514e785e8.acm-validations.aws.".to_string(),
    }
}

impl FakeCloud {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                calls: Vec::new(),
                buckets: HashSet::new(),
                foreign_buckets: HashSet::new(),
                failures: HashMap::new(),
                failing_keys: HashSet::new(),
                objects: Vec::new(),
                validation_record: Some(sample_validation_record()),
                certificates: HashMap::new(),
                pending_polls: 0,
                certificate_status: CertificateStatus::Issued,
                distributions: Vec::new(),
                distribution_specs: Vec::new(),
            })),
        }
    }

    pub fn with_bucket(self, name: &str) -> Self {
        self.state.lock().unwrap().buckets.insert(name.to_string());
        self
    }

    pub fn with_foreign_bucket(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .foreign_buckets
            .insert(name.to_string());
        self
    }

    pub fn with_distribution(self, alias: &str, domain_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .distributions
            .push(DistributionSummary {
                id: "E2EXISTING".to_string(),
                domain_name: domain_name.to_string(),
                aliases: vec![alias.to_string(), format!("www.{alias}")],
            });
        self
    }

    pub fn with_validation_record(self, record: Option<ValidationRecord>) -> Self {
        self.state.lock().unwrap().validation_record = record;
        self
    }

    /// Certificate for `domain_name` left behind by an earlier run
    pub fn with_certificate(self, domain_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .certificates
            .insert(domain_name.to_string(), FAKE_CERT_ARN.to_string());
        self
    }

    /// Report `PendingValidation` for the first `polls` status calls
    pub fn with_pending_polls(self, polls: usize) -> Self {
        self.state.lock().unwrap().pending_polls = polls;
        self
    }

    /// Status reported once the pending polls are used up
    pub fn with_certificate_status(self, status: CertificateStatus) -> Self {
        self.state.lock().unwrap().certificate_status = status;
        self
    }

    /// Make the named trait method fail with `err`
    pub fn fail_on(self, method: &'static str, err: ProviderError) -> Self {
        self.state.lock().unwrap().failures.insert(method, err);
        self
    }

    pub fn clear_failure(&self, method: &str) {
        self.state.lock().unwrap().failures.remove(method);
    }

    /// Make uploads of `key` fail
    pub fn fail_upload(self, key: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_keys
            .insert(key.to_string());
        self
    }

    pub fn storage(&self) -> Arc<dyn ObjectStorage> {
        Arc::new(self.clone())
    }

    pub fn certificates(&self) -> Arc<dyn CertificateAuthority> {
        Arc::new(self.clone())
    }

    pub fn cdn(&self) -> Arc<dyn CdnService> {
        Arc::new(self.clone())
    }

    pub fn dns(&self) -> Arc<dyn DnsService> {
        Arc::new(self.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn objects(&self) -> Vec<PutObject> {
        self.state.lock().unwrap().objects.clone()
    }

    pub fn distribution_specs(&self) -> Vec<DistributionSpec> {
        self.state.lock().unwrap().distribution_specs.clone()
    }

    fn record(&self, method: &'static str, call: Call) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStorage for FakeCloud {
    async fn create_bucket(&self, name: &str, _region: &str) -> ProviderResult<BucketCreation> {
        self.record("create_bucket", Call::CreateBucket(name.to_string()))?;
        let mut state = self.state.lock().unwrap();
        if state.foreign_buckets.contains(name) {
            return Ok(BucketCreation::OwnedByOther);
        }
        if state.buckets.insert(name.to_string()) {
            Ok(BucketCreation::Created)
        } else {
            Ok(BucketCreation::OwnedByCaller)
        }
    }

    async fn allow_public_policy(&self, name: &str) -> ProviderResult<()> {
        self.record(
            "allow_public_policy",
            Call::AllowPublicPolicy(name.to_string()),
        )
    }

    async fn put_bucket_policy(&self, name: &str, _policy: &str) -> ProviderResult<()> {
        self.record("put_bucket_policy", Call::PutBucketPolicy(name.to_string()))
    }

    async fn put_bucket_website(&self, name: &str, index_suffix: &str) -> ProviderResult<()> {
        self.record(
            "put_bucket_website",
            Call::PutBucketWebsite(name.to_string(), index_suffix.to_string()),
        )
    }

    async fn put_object(&self, object: PutObject) -> ProviderResult<()> {
        self.record("put_object", Call::PutObject(object.key.clone()))?;
        let mut state = self.state.lock().unwrap();
        if state.failing_keys.contains(&object.key) {
            return Err(ProviderError::coded(
                Service::ObjectStorage,
                "InternalError",
                format!("upload of {} failed", object.key),
            ));
        }
        state.objects.push(object);
        Ok(())
    }
}

#[async_trait]
impl CertificateAuthority for FakeCloud {
    async fn request_certificate(&self, request: &CertificateRequest) -> ProviderResult<String> {
        self.record(
            "request_certificate",
            Call::RequestCertificate(request.domain_name.clone()),
        )?;
        self.state
            .lock()
            .unwrap()
            .certificates
            .insert(request.domain_name.clone(), FAKE_CERT_ARN.to_string());
        Ok(FAKE_CERT_ARN.to_string())
    }

    async fn describe_certificate(&self, arn: &str) -> ProviderResult<Vec<DomainValidation>> {
        self.record(
            "describe_certificate",
            Call::DescribeCertificate(arn.to_string()),
        )?;
        let state = self.state.lock().unwrap();
        Ok(vec![DomainValidation {
            domain_name: "*.example.com".to_string(),
            record: state.validation_record.clone(),
        }])
    }

    async fn certificate_status(&self, arn: &str) -> ProviderResult<CertificateStatus> {
        self.record(
            "certificate_status",
            Call::CertificateStatus(arn.to_string()),
        )?;
        let mut state = self.state.lock().unwrap();
        if state.pending_polls > 0 {
            state.pending_polls -= 1;
            return Ok(CertificateStatus::PendingValidation);
        }
        Ok(state.certificate_status.clone())
    }

    async fn find_certificate(&self, domain_name: &str) -> ProviderResult<Option<String>> {
        self.record(
            "find_certificate",
            Call::FindCertificate(domain_name.to_string()),
        )?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .certificates
            .get(domain_name)
            .cloned())
    }
}

#[async_trait]
impl CdnService for FakeCloud {
    async fn create_distribution(&self, spec: &DistributionSpec) -> ProviderResult<String> {
        self.record(
            "create_distribution",
            Call::CreateDistribution(spec.aliases.clone()),
        )?;
        let mut state = self.state.lock().unwrap();
        state.distribution_specs.push(spec.clone());
        state.distributions.push(DistributionSummary {
            id: "E2NEW".to_string(),
            domain_name: FAKE_CDN_DOMAIN.to_string(),
            aliases: spec.aliases.clone(),
        });
        Ok(FAKE_CDN_DOMAIN.to_string())
    }

    async fn find_distribution_by_alias(
        &self,
        alias: &str,
    ) -> ProviderResult<Option<DistributionSummary>> {
        self.record(
            "find_distribution_by_alias",
            Call::FindDistribution(alias.to_string()),
        )?;
        let state = self.state.lock().unwrap();
        Ok(state
            .distributions
            .iter()
            .find(|d| d.aliases.iter().any(|a| a == alias))
            .cloned())
    }
}

#[async_trait]
impl DnsService for FakeCloud {
    async fn change_resource_record_sets(
        &self,
        hosted_zone_id: &str,
        changes: &[RecordChange],
    ) -> ProviderResult<()> {
        self.record(
            "change_resource_record_sets",
            Call::ChangeRecords(hosted_zone_id.to_string(), changes.to_vec()),
        )
    }
}
