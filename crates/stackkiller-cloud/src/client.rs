//! Stack-management client trait definition

use crate::error::ServiceError;
use crate::stack::{ResourcePage, StackDescription};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Stack-management client abstraction
///
/// Provider adapters (CloudFormation, a local simulator, the in-memory test
/// client) implement this trait. All methods return the provider's error
/// unchanged as a [`ServiceError`]; interpretation is left to the caller.
#[async_trait]
pub trait StackClient: Send + Sync {
    /// Returns the client name for logs (e.g., "cloudformation")
    fn name(&self) -> &str;

    /// Request deletion of a stack
    ///
    /// Returns as soon as the request is accepted; deletion proceeds
    /// server-side. Resources in `retain_resources` are detached from the
    /// stack instead of being deleted.
    async fn delete_stack(
        &self,
        stack_name: &str,
        retain_resources: &BTreeSet<String>,
    ) -> std::result::Result<(), ServiceError>;

    /// Fetch the current descriptor of a stack
    ///
    /// Fails with a message ending in "does not exist" when the stack is absent.
    async fn describe_stack(
        &self,
        stack_name: &str,
    ) -> std::result::Result<StackDescription, ServiceError>;

    /// Fetch one page of the stack's resources
    async fn list_stack_resources(
        &self,
        stack_name: &str,
        next_token: Option<&str>,
    ) -> std::result::Result<ResourcePage, ServiceError>;
}
