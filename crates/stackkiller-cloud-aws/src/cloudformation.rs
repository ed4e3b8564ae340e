//! CloudFormation implementation of [`StackClient`]

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::config::Region;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use stackkiller_cloud::{
    ResourcePage, ServiceError, StackClient, StackDescription, StackResource,
};
use std::collections::BTreeSet;

/// Endpoint used when targeting a local simulator (LocalStack)
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:4566";

/// Region used for the local simulator when none is configured
const LOCAL_REGION: &str = "us-east-1";

/// Which CloudFormation endpoint to talk to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// AWS, with region and credentials resolved from the environment
    Production,
    /// A local or simulated endpoint
    Local { endpoint_url: String },
}

impl Target {
    pub fn local(endpoint_url: impl Into<String>) -> Self {
        Target::Local {
            endpoint_url: endpoint_url.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Target::Production => Ok(()),
            Target::Local { endpoint_url } => {
                if endpoint_url.starts_with("http://") || endpoint_url.starts_with("https://") {
                    Ok(())
                } else {
                    Err(AwsError::InvalidEndpoint(endpoint_url.clone()))
                }
            }
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Production => write!(f, "aws"),
            Target::Local { endpoint_url } => write!(f, "local ({})", endpoint_url),
        }
    }
}

/// CloudFormation stack client
#[derive(Debug, Clone)]
pub struct CloudFormationClient {
    client: Client,
    name: String,
}

impl CloudFormationClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            name: "cloudformation".to_string(),
        }
    }

    /// Build a client for `target` from the default SDK configuration chain
    pub async fn connect(target: &Target, region: Option<String>) -> Result<Self> {
        target.validate()?;

        let region = match (region, target) {
            (Some(region), _) if region.trim().is_empty() => {
                return Err(AwsError::InvalidRegion(region));
            }
            (Some(region), _) => Some(region),
            (None, Target::Local { .. }) => Some(LOCAL_REGION.to_string()),
            (None, Target::Production) => None,
        };

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Target::Local { endpoint_url } = target {
            loader = loader.endpoint_url(endpoint_url.clone());
        }

        let config = loader.load().await;
        tracing::debug!(
            "CloudFormation client for {} in region {:?}",
            target,
            config.region()
        );

        let mut client = Self::new(Client::new(&config));
        client.name = format!("cloudformation/{}", target);
        Ok(client)
    }
}

#[async_trait]
impl StackClient for CloudFormationClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn delete_stack(
        &self,
        stack_name: &str,
        retain_resources: &BTreeSet<String>,
    ) -> std::result::Result<(), ServiceError> {
        let retain = if retain_resources.is_empty() {
            None
        } else {
            Some(retain_resources.iter().cloned().collect::<Vec<_>>())
        };

        tracing::debug!("DeleteStack {} (retain: {:?})", stack_name, retain);
        self.client
            .delete_stack()
            .stack_name(stack_name)
            .set_retain_resources(retain)
            .send()
            .await
            .map_err(to_service_error)?;
        Ok(())
    }

    async fn describe_stack(
        &self,
        stack_name: &str,
    ) -> std::result::Result<StackDescription, ServiceError> {
        let response = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(to_service_error)?;

        let stack = response
            .stacks()
            .first()
            .ok_or_else(|| missing_stack(stack_name))?;

        let status = stack
            .stack_status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
        let mut description =
            StackDescription::new(stack.stack_name().unwrap_or(stack_name), status);
        if let Some(reason) = stack.stack_status_reason() {
            description = description.with_reason(reason);
        }
        Ok(description)
    }

    async fn list_stack_resources(
        &self,
        stack_name: &str,
        next_token: Option<&str>,
    ) -> std::result::Result<ResourcePage, ServiceError> {
        let response = self
            .client
            .list_stack_resources()
            .stack_name(stack_name)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(to_service_error)?;

        let resources = response
            .stack_resource_summaries()
            .iter()
            .filter_map(|summary| {
                resource_from_parts(
                    summary.physical_resource_id(),
                    summary.logical_resource_id(),
                    summary.resource_status().map(|s| s.as_str()),
                    summary.resource_type(),
                )
            })
            .collect();

        Ok(ResourcePage {
            resources,
            next_token: response.next_token().map(str::to_string),
        })
    }
}

/// Convert an SDK error, keeping the service's code and message when present
fn to_service_error<E, R>(err: SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let (code, message) = match err.as_service_error() {
        Some(service_error) => (
            service_error.code().map(str::to_string),
            service_error.message().map(str::to_string),
        ),
        None => (None, None),
    };
    service_error_from_parts(code, message, || DisplayErrorContext(&err).to_string())
}

fn service_error_from_parts(
    code: Option<String>,
    message: Option<String>,
    fallback: impl FnOnce() -> String,
) -> ServiceError {
    ServiceError {
        code,
        message: message.unwrap_or_else(fallback),
    }
}

fn missing_stack(stack_name: &str) -> ServiceError {
    ServiceError::with_code(
        "ValidationError",
        format!("Stack with id {} does not exist", stack_name),
    )
}

/// Build a resource from a summary's fields
///
/// Resources that were never created have no physical id; they are
/// identified by their logical id instead. A summary with neither is dropped.
fn resource_from_parts(
    physical_id: Option<&str>,
    logical_id: Option<&str>,
    status: Option<&str>,
    resource_type: Option<&str>,
) -> Option<StackResource> {
    let id = physical_id
        .filter(|id| !id.is_empty())
        .or(logical_id.filter(|id| !id.is_empty()))?;

    let mut resource = StackResource::new(id, status.unwrap_or_default());
    if let Some(logical_id) = logical_id {
        resource = resource.with_logical_id(logical_id);
    }
    if let Some(resource_type) = resource_type {
        resource = resource.with_type(resource_type);
    }
    Some(resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_validation() {
        assert!(Target::Production.validate().is_ok());
        assert!(Target::local(DEFAULT_LOCAL_ENDPOINT).validate().is_ok());
        assert!(Target::local("https://cfn.internal:8443").validate().is_ok());
        assert!(matches!(
            Target::local("localhost:4566").validate(),
            Err(AwsError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_target_display() {
        assert_eq!(Target::Production.to_string(), "aws");
        assert_eq!(
            Target::local(DEFAULT_LOCAL_ENDPOINT).to_string(),
            "local (http://localhost:4566)"
        );
    }

    #[test]
    fn test_missing_stack_is_not_found() {
        assert!(missing_stack("demo").is_not_found());
    }

    #[test]
    fn test_service_error_prefers_service_message() {
        let err = service_error_from_parts(
            Some("ValidationError".to_string()),
            Some("Stack with id demo does not exist".to_string()),
            || panic!("fallback should not be used"),
        );
        assert!(err.is_not_found());
        assert_eq!(err.code.as_deref(), Some("ValidationError"));

        let err = service_error_from_parts(None, None, || "dispatch failure".to_string());
        assert_eq!(err.message, "dispatch failure");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_resource_from_parts() {
        let resource = resource_from_parts(
            Some("my-bucket-1a2b"),
            Some("Bucket"),
            Some("DELETE_FAILED"),
            Some("AWS::S3::Bucket"),
        )
        .unwrap();
        assert_eq!(resource.physical_id, "my-bucket-1a2b");
        assert!(resource.is_delete_failed());
        assert_eq!(resource.logical_id.as_deref(), Some("Bucket"));
        assert_eq!(resource.resource_type.as_deref(), Some("AWS::S3::Bucket"));
    }

    #[test]
    fn test_resource_without_physical_id_uses_logical_id() {
        let resource =
            resource_from_parts(None, Some("Queue"), Some("DELETE_FAILED"), None).unwrap();
        assert_eq!(resource.physical_id, "Queue");

        let resource =
            resource_from_parts(Some(""), Some("Queue"), Some("DELETE_FAILED"), None).unwrap();
        assert_eq!(resource.physical_id, "Queue");

        assert!(resource_from_parts(None, None, Some("DELETE_FAILED"), None).is_none());
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_target() {
        let err = CloudFormationClient::connect(&Target::local("localhost"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AwsError::InvalidEndpoint(_)));

        let err = CloudFormationClient::connect(&Target::Production, Some("  ".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AwsError::InvalidRegion(_)));
    }
}
