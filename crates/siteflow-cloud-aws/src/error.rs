//! AWS provider error types

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use siteflow_cloud::{ProviderError, Service};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("AWS credentials are missing: {0} is empty")]
    MissingCredentials(&'static str),

    #[error("Invalid AWS region: {0:?}")]
    InvalidRegion(String),
}

pub type Result<T> = std::result::Result<T, AwsError>;

/// Translate an SDK error, keeping the service error code when there is one
pub(crate) fn provider_error<E>(service: Service, err: E) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    ProviderError::new(service, code, message)
}

/// Request could not be assembled (a required field was left unset)
pub(crate) fn build_error(service: Service, err: impl std::fmt::Display) -> ProviderError {
    ProviderError::new(service, None, format!("invalid request: {err}"))
}
