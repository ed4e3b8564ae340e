//! Stack status classification

use crate::client::StackClient;
use crate::error::Result;
use crate::stack::StackStatus;

/// Classify the live status of a stack
///
/// A "does not exist" error is absorbed into [`StackStatus::Nonexistent`].
/// Every other service error is returned unchanged.
pub async fn classify<C>(client: &C, stack_name: &str) -> Result<StackStatus>
where
    C: StackClient + ?Sized,
{
    match client.describe_stack(stack_name).await {
        Ok(description) => {
            let status = StackStatus::from_provider(&description.status);
            tracing::debug!(
                "Stack {} reports {} ({})",
                stack_name,
                description.status,
                status
            );
            Ok(status)
        }
        Err(err) if err.is_not_found() => {
            tracing::debug!("Stack {} does not exist", stack_name);
            Ok(StackStatus::Nonexistent)
        }
        Err(err) => Err(err.into()),
    }
}
