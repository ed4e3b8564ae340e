//! Stack deletion orchestrator
//!
//! Drives a stack to a terminal state: request deletion, wait, classify, and
//! when force deletion is requested, retry with the resources that blocked
//! deletion marked as retained.

use crate::client::StackClient;
use crate::error::{Result, StackError};
use crate::stack::{DeletionOutcome, StackResource, StackStatus};
use crate::status::classify;
use crate::waiter::{DEFAULT_POLL_INTERVAL, WaitConfig, wait_for_deletion};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Tunables for the deletion workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSettings {
    /// Delay between status checks while waiting
    pub poll_interval: Duration,

    /// Maximum number of delete requests per workflow (first attempt included)
    pub max_delete_attempts: u32,

    /// Maximum number of resource listing pages to follow
    pub max_pages: u32,
}

impl Default for DeleteSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_delete_attempts: 3,
            max_pages: 100,
        }
    }
}

impl DeleteSettings {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(StackError::Config("poll interval must be positive".into()));
        }
        if self.max_delete_attempts == 0 {
            return Err(StackError::Config(
                "max delete attempts must be at least 1".into(),
            ));
        }
        if self.max_pages == 0 {
            return Err(StackError::Config("max pages must be at least 1".into()));
        }
        Ok(())
    }
}

/// Stack deletion orchestrator
pub struct StackDeleter<C: StackClient + ?Sized> {
    client: Arc<C>,
    settings: DeleteSettings,
}

impl<C: StackClient + ?Sized> StackDeleter<C> {
    pub fn new(client: Arc<C>, settings: DeleteSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &DeleteSettings {
        &self.settings
    }

    /// Delete a stack and wait for the outcome
    ///
    /// Without `force_deletion` a single attempt is made and its outcome is
    /// reported as-is. With it, a `DELETE_FAILED` stack is deleted again with
    /// its failed resources retained, up to `max_delete_attempts` requests.
    ///
    /// A non-deleted final status is not an error; check
    /// [`DeletionOutcome::is_deleted`].
    pub async fn delete_stack(
        &self,
        stack_name: &str,
        force_deletion: bool,
        max_wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<DeletionOutcome> {
        self.settings.validate()?;
        let wait = WaitConfig::for_budget(max_wait, self.settings.poll_interval);

        tracing::info!(
            "Deleting stack {} via {} (force: {}, up to {} checks every {:?})",
            stack_name,
            self.client.name(),
            force_deletion,
            wait.max_attempts,
            wait.interval
        );

        let mut outcome = DeletionOutcome {
            stack: stack_name.to_string(),
            status: StackStatus::DeleteInProgress,
            attempts: 0,
            retained: BTreeSet::new(),
        };
        let mut retain = BTreeSet::new();

        loop {
            outcome.status = self
                .attempt_delete(stack_name, &retain, &wait, cancel)
                .await?;
            outcome.attempts += 1;
            outcome.retained.extend(retain.iter().cloned());

            if !force_deletion || outcome.status != StackStatus::DeleteFailed {
                break;
            }
            if outcome.attempts >= self.settings.max_delete_attempts {
                tracing::warn!(
                    "Stack {} still DELETE_FAILED after {} delete requests",
                    stack_name,
                    outcome.attempts
                );
                break;
            }

            retain = self
                .failed_resources(stack_name)
                .await?
                .into_iter()
                .map(|resource| resource.physical_id)
                .collect();

            if retain.is_empty() {
                tracing::warn!(
                    "Stack {} is DELETE_FAILED but no resource reports DELETE_FAILED",
                    stack_name
                );
                break;
            }

            tracing::info!(
                "Retrying deletion of {} retaining {} resource(s)",
                stack_name,
                retain.len()
            );
        }

        report_outcome(&outcome);
        Ok(outcome)
    }

    /// One delete request followed by a bounded wait
    ///
    /// A wait that runs out while the stack is still `DELETE_IN_PROGRESS` is
    /// reported as that status. Any other live status surfaces the wait error.
    async fn attempt_delete(
        &self,
        stack_name: &str,
        retain: &BTreeSet<String>,
        wait: &WaitConfig,
        cancel: &CancellationToken,
    ) -> Result<StackStatus> {
        if retain.is_empty() {
            tracing::info!("Requesting deletion of stack {}", stack_name);
        } else {
            tracing::info!(
                "Requesting deletion of stack {} retaining {:?}",
                stack_name,
                retain
            );
        }
        self.client.delete_stack(stack_name, retain).await?;

        match wait_for_deletion(self.client.as_ref(), stack_name, wait, cancel).await {
            Ok(status) => Ok(status),
            Err(wait_error) if wait_error.is_wait_failure() => {
                match classify(self.client.as_ref(), stack_name).await {
                    Ok(StackStatus::DeleteInProgress) => {
                        tracing::debug!(
                            "Wait for {} ended ({}) but deletion is still running",
                            stack_name,
                            wait_error
                        );
                        Ok(StackStatus::DeleteInProgress)
                    }
                    Ok(_) => Err(wait_error),
                    Err(check_error) => {
                        tracing::debug!(
                            "Status check for {} after wait failure failed: {}",
                            stack_name,
                            check_error
                        );
                        Err(wait_error)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Current classified status of a stack
    pub async fn status(&self, stack_name: &str) -> Result<StackStatus> {
        classify(self.client.as_ref(), stack_name).await
    }

    /// All resources of a stack, following continuation tokens
    pub async fn list_stack_resources(&self, stack_name: &str) -> Result<Vec<StackResource>> {
        let mut resources = Vec::new();
        let mut next_token: Option<String> = None;

        for page in 1..=self.settings.max_pages {
            let response = self
                .client
                .list_stack_resources(stack_name, next_token.as_deref())
                .await?;
            tracing::debug!(
                "Resource page {} for {}: {} resource(s)",
                page,
                stack_name,
                response.resources.len()
            );
            resources.extend(response.resources);

            match response.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(resources),
            }
        }

        Err(StackError::PaginationExhausted {
            stack: stack_name.to_string(),
            pages: self.settings.max_pages,
        })
    }

    /// Resources whose status is exactly `DELETE_FAILED`
    pub async fn failed_resources(&self, stack_name: &str) -> Result<Vec<StackResource>> {
        Ok(self
            .list_stack_resources(stack_name)
            .await?
            .into_iter()
            .filter(StackResource::is_delete_failed)
            .collect())
    }
}

fn report_outcome(outcome: &DeletionOutcome) {
    match outcome.status {
        StackStatus::DeleteComplete | StackStatus::Nonexistent => {
            tracing::info!(
                "Stack {} deleted ({}, {} request(s))",
                outcome.stack,
                outcome.status,
                outcome.attempts
            );
        }
        StackStatus::DeleteInProgress => {
            tracing::warn!(
                "Stack {} is still being deleted after the wait budget",
                outcome.stack
            );
        }
        status => {
            tracing::warn!("Stack {} ended in {}", outcome.stack, status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStackClient;

    fn deleter(client: &Arc<InMemoryStackClient>) -> StackDeleter<InMemoryStackClient> {
        StackDeleter::new(client.clone(), DeleteSettings::default())
    }

    #[test]
    fn test_settings_validation() {
        assert!(DeleteSettings::default().validate().is_ok());

        let settings = DeleteSettings {
            poll_interval: Duration::ZERO,
            ..DeleteSettings::default()
        };
        assert!(matches!(settings.validate(), Err(StackError::Config(_))));

        let settings = DeleteSettings {
            max_delete_attempts: 0,
            ..DeleteSettings::default()
        };
        assert!(matches!(settings.validate(), Err(StackError::Config(_))));

        let settings = DeleteSettings {
            max_pages: 0,
            ..DeleteSettings::default()
        };
        assert!(matches!(settings.validate(), Err(StackError::Config(_))));
    }

    #[tokio::test]
    async fn test_listing_concatenates_pages_in_order() {
        let client = Arc::new(InMemoryStackClient::new());
        client.set_pages(
            "demo",
            vec![
                vec![
                    StackResource::new("r1", "DELETE_COMPLETE"),
                    StackResource::new("r2", "DELETE_FAILED"),
                ],
                vec![
                    StackResource::new("r3", "DELETE_COMPLETE"),
                    StackResource::new("r4", "DELETE_FAILED"),
                ],
                vec![StackResource::new("r5", "DELETE_SKIPPED")],
            ],
        );

        let resources = deleter(&client).list_stack_resources("demo").await.unwrap();
        let ids: Vec<&str> = resources.iter().map(|r| r.physical_id.as_str()).collect();

        assert_eq!(ids, ["r1", "r2", "r3", "r4", "r5"]);
        assert_eq!(client.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_listing_empty_stack() {
        let client = Arc::new(InMemoryStackClient::new());
        client.set_pages("demo", Vec::new());

        let resources = deleter(&client).list_stack_resources("demo").await.unwrap();
        assert!(resources.is_empty());
        assert_eq!(client.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_listing_stops_at_page_ceiling() {
        let client = Arc::new(InMemoryStackClient::new());
        client.set_endless_pages("demo");

        let settings = DeleteSettings {
            max_pages: 7,
            ..DeleteSettings::default()
        };
        let err = StackDeleter::new(client.clone(), settings)
            .list_stack_resources("demo")
            .await
            .unwrap_err();

        match err {
            StackError::PaginationExhausted { stack, pages } => {
                assert_eq!(stack, "demo");
                assert_eq!(pages, 7);
            }
            other => panic!("Expected PaginationExhausted, got {:?}", other),
        }
        assert_eq!(client.list_calls(), 7);
    }

    #[tokio::test]
    async fn test_failed_resources_filter() {
        let client = Arc::new(InMemoryStackClient::new());
        client.set_pages(
            "demo",
            vec![vec![
                StackResource::new("r1", "DELETE_FAILED"),
                StackResource::new("r2", "DELETE_COMPLETE"),
                StackResource::new("r3", "delete_failed"),
            ]],
        );

        let failed = deleter(&client).failed_resources("demo").await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].physical_id, "r1");
    }

    #[tokio::test]
    async fn test_delete_rejects_invalid_settings() {
        let client = Arc::new(InMemoryStackClient::new());
        let settings = DeleteSettings {
            max_delete_attempts: 0,
            ..DeleteSettings::default()
        };

        let err = StackDeleter::new(client.clone(), settings)
            .delete_stack("demo", true, Duration::from_secs(60), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StackError::Config(_)));
        assert!(client.delete_calls().is_empty());
    }
}
