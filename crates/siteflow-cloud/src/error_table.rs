//! Provider error-code tables
//!
//! Maps the error codes each service is known to return onto a severity and
//! a short human explanation. Lookups only drive diagnostics: a failed
//! provisioning call aborts the run whatever its classification.

use crate::provider::{ProviderError, Service};

/// How a known provider error should be read by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The condition can clear on its own; re-running later may succeed
    Retryable,
    /// Needs a change to configuration or account state before re-running
    Fatal,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Retryable => write!(f, "retryable"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownError {
    pub code: &'static str,
    pub severity: Severity,
    pub summary: &'static str,
}

const fn known(code: &'static str, severity: Severity, summary: &'static str) -> KnownError {
    KnownError {
        code,
        severity,
        summary,
    }
}

/// Known error codes of one service
#[derive(Debug)]
pub struct ErrorTable {
    pub service: Service,
    entries: &'static [KnownError],
}

impl ErrorTable {
    pub const fn new(service: Service, entries: &'static [KnownError]) -> Self {
        Self { service, entries }
    }

    pub fn lookup(&self, code: &str) -> Option<&'static KnownError> {
        self.entries.iter().find(|e| e.code == code)
    }

    pub fn classify(&self, err: &ProviderError) -> Option<&'static KnownError> {
        err.code.as_deref().and_then(|code| self.lookup(code))
    }

    /// Log a provider error with its classification and return it
    pub fn report(&self, err: &ProviderError) -> Option<&'static KnownError> {
        let known = self.classify(err);
        match known {
            Some(k) if k.severity == Severity::Retryable => {
                tracing::warn!(
                    service = %self.service,
                    code = k.code,
                    "{}: {}",
                    k.summary,
                    err.message
                );
            }
            Some(k) => {
                tracing::error!(
                    service = %self.service,
                    code = k.code,
                    "{}: {}",
                    k.summary,
                    err.message
                );
            }
            None => {
                tracing::error!(service = %self.service, "{}", err);
            }
        }
        known
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Table for the service that produced `err`
pub fn table_for(service: Service) -> &'static ErrorTable {
    match service {
        Service::ObjectStorage => &S3_ERRORS,
        Service::Certificates => &ACM_ERRORS,
        Service::Cdn => &CLOUDFRONT_ERRORS,
        Service::Dns => &ROUTE53_ERRORS,
    }
}

/// Report `err` against its service's table
pub fn report(err: &ProviderError) -> Option<&'static KnownError> {
    table_for(err.service).report(err)
}

use Severity::{Fatal, Retryable};

const S3_CODES: &[KnownError] = &[
    known(
        "BucketAlreadyExists",
        Fatal,
        "bucket name is owned by another account",
    ),
    known(
        "BucketAlreadyOwnedByYou",
        Fatal,
        "bucket already exists in this account",
    ),
    known("InvalidBucketName", Fatal, "bucket name is not valid"),
    known(
        "IllegalLocationConstraintException",
        Fatal,
        "bucket region does not match the request region",
    ),
    known("AccessDenied", Fatal, "credentials lack permission"),
    known("MalformedPolicy", Fatal, "bucket policy was rejected"),
    known("NoSuchBucket", Fatal, "bucket does not exist"),
    known("SlowDown", Retryable, "request rate too high"),
    known(
        "OperationAborted",
        Retryable,
        "a conflicting operation is in progress on this bucket",
    ),
];

pub static S3_ERRORS: ErrorTable = ErrorTable::new(Service::ObjectStorage, S3_CODES);

const ACM_CODES: &[KnownError] = &[
    known(
        "LimitExceededException",
        Retryable,
        "certificate request limit exceeded",
    ),
    known(
        "InvalidDomainValidationOptionsException",
        Retryable,
        "domain validation options are not valid",
    ),
    known("InvalidArnException", Retryable, "certificate ARN is not valid"),
    known(
        "ResourceNotFoundException",
        Fatal,
        "certificate does not exist",
    ),
    known(
        "InvalidParameterException",
        Fatal,
        "certificate request parameter is not valid",
    ),
    known("ThrottlingException", Retryable, "request was throttled"),
];

pub static ACM_ERRORS: ErrorTable = ErrorTable::new(Service::Certificates, ACM_CODES);

const CLOUDFRONT_CODES: &[KnownError] = &[
    known(
        "CNAMEAlreadyExists",
        Fatal,
        "an alias is already used by another distribution",
    ),
    known(
        "DistributionAlreadyExists",
        Fatal,
        "a distribution with this caller reference already exists",
    ),
    known("InvalidOrigin", Fatal, "origin is not a valid endpoint"),
    known(
        "InvalidOriginAccessIdentity",
        Fatal,
        "origin access identity is not valid",
    ),
    known("AccessDenied", Fatal, "credentials lack permission"),
    known("TooManyTrustedSigners", Fatal, "too many trusted signers"),
    known(
        "TrustedSignerDoesNotExist",
        Fatal,
        "a trusted signer does not exist",
    ),
    known(
        "InvalidViewerCertificate",
        Retryable,
        "viewer certificate is not usable yet (it may still be pending validation)",
    ),
    known(
        "InvalidMinimumProtocolVersion",
        Fatal,
        "minimum protocol version is not valid",
    ),
    known("MissingBody", Fatal, "request body is missing"),
    known(
        "TooManyDistributionCNAMEs",
        Fatal,
        "too many aliases for one distribution",
    ),
    known("TooManyDistributions", Fatal, "distribution limit reached"),
    known(
        "InvalidDefaultRootObject",
        Fatal,
        "default root object is not valid",
    ),
    known("InvalidRelativePath", Fatal, "relative path is not valid"),
    known("InvalidErrorCode", Fatal, "custom error code is not valid"),
    known(
        "InvalidResponseCode",
        Fatal,
        "custom response code is not valid",
    ),
    known("InvalidArgument", Fatal, "an argument is not valid"),
    known(
        "InvalidRequiredProtocol",
        Fatal,
        "required protocol is not valid",
    ),
    known("NoSuchOrigin", Fatal, "cache behavior targets an unknown origin"),
    known("TooManyOrigins", Fatal, "too many origins"),
    known("TooManyCacheBehaviors", Fatal, "too many cache behaviors"),
    known(
        "TooManyCookieNamesInWhiteList",
        Fatal,
        "too many forwarded cookie names",
    ),
    known(
        "InvalidForwardCookies",
        Fatal,
        "cookie forwarding settings are not valid",
    ),
    known(
        "TooManyHeadersInForwardedValues",
        Fatal,
        "too many forwarded headers",
    ),
    known(
        "InvalidHeadersForS3Origin",
        Fatal,
        "headers are not allowed for an S3 origin",
    ),
    known(
        "InconsistentQuantities",
        Fatal,
        "a quantity does not match its item list",
    ),
    known("TooManyCertificates", Fatal, "too many certificates"),
    known("InvalidLocationCode", Fatal, "location code is not valid"),
    known(
        "InvalidGeoRestrictionParameter",
        Fatal,
        "geo restriction parameter is not valid",
    ),
    known(
        "InvalidProtocolSettings",
        Fatal,
        "protocol settings are not valid",
    ),
    known("InvalidTTLOrder", Fatal, "cache TTL values are out of order"),
    known("InvalidWebACLId", Fatal, "web ACL id is not valid"),
    known(
        "TooManyOriginCustomHeaders",
        Fatal,
        "too many origin custom headers",
    ),
    known(
        "TooManyQueryStringParameters",
        Fatal,
        "too many forwarded query string parameters",
    ),
    known(
        "InvalidQueryStringParameters",
        Fatal,
        "query string parameters are not valid",
    ),
    known(
        "TooManyDistributionsWithLambdaAssociations",
        Fatal,
        "too many distributions with lambda associations",
    ),
    known(
        "TooManyLambdaFunctionAssociations",
        Fatal,
        "too many lambda function associations",
    ),
    known(
        "InvalidLambdaFunctionAssociation",
        Fatal,
        "lambda function association is not valid",
    ),
    known(
        "InvalidOriginReadTimeout",
        Fatal,
        "origin read timeout is not valid",
    ),
    known(
        "InvalidOriginKeepaliveTimeout",
        Fatal,
        "origin keepalive timeout is not valid",
    ),
];

pub static CLOUDFRONT_ERRORS: ErrorTable = ErrorTable::new(Service::Cdn, CLOUDFRONT_CODES);

const ROUTE53_CODES: &[KnownError] = &[
    known("NoSuchHostedZone", Fatal, "hosted zone does not exist"),
    known("NoSuchHealthCheck", Fatal, "health check does not exist"),
    known(
        "InvalidChangeBatch",
        Fatal,
        "change batch was rejected",
    ),
    known("InvalidInput", Fatal, "input is not valid"),
    known(
        "PriorRequestNotComplete",
        Retryable,
        "a previous change to this zone is still in progress",
    ),
    known("Throttling", Retryable, "request was throttled"),
];

pub static ROUTE53_ERRORS: ErrorTable = ErrorTable::new(Service::Dns, ROUTE53_CODES);
