//! In-memory stack client for tests
//!
//! Statuses, resource pages and errors are scripted per stack. Describe
//! results are consumed in order and the last one sticks, so a test only
//! scripts the transitions it cares about. Every delete request is recorded.

use crate::client::StackClient;
use crate::error::ServiceError;
use crate::stack::{ResourcePage, StackDescription, StackResource};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

type DescribeResult = std::result::Result<StackDescription, ServiceError>;

/// A delete request observed by [`InMemoryStackClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCall {
    pub stack: String,
    pub retained: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct StackScript {
    describe: VecDeque<DescribeResult>,
    after_delete: VecDeque<Vec<DescribeResult>>,
    pages: Vec<Vec<StackResource>>,
    endless_pages: bool,
    delete_error: Option<ServiceError>,
    list_error: Option<ServiceError>,
}

#[derive(Debug, Default)]
struct Inner {
    stacks: HashMap<String, StackScript>,
    deletes: Vec<DeleteCall>,
    describe_calls: usize,
    list_calls: usize,
}

/// Scripted [`StackClient`] implementation
#[derive(Debug, Default)]
pub struct InMemoryStackClient {
    inner: Mutex<Inner>,
}

/// The error CloudFormation returns for an unknown stack name
pub fn not_found(stack_name: &str) -> ServiceError {
    ServiceError::with_code(
        "ValidationError",
        format!("Stack with id {} does not exist", stack_name),
    )
}

impl InMemoryStackClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn with_stack<R>(&self, stack_name: &str, f: impl FnOnce(&mut StackScript) -> R) -> R {
        let mut inner = self.lock();
        f(inner.stacks.entry(stack_name.to_string()).or_default())
    }

    /// Queue a provider status for `describe_stack`
    pub fn push_status(&self, stack_name: &str, status: &str) -> &Self {
        let description = StackDescription::new(stack_name, status);
        self.with_stack(stack_name, |s| s.describe.push_back(Ok(description)));
        self
    }

    /// Queue a "does not exist" answer for `describe_stack`
    pub fn push_missing(&self, stack_name: &str) -> &Self {
        self.push_describe_error(stack_name, not_found(stack_name))
    }

    pub fn push_describe_error(&self, stack_name: &str, error: ServiceError) -> &Self {
        self.with_stack(stack_name, |s| s.describe.push_back(Err(error)));
        self
    }

    /// Replace the describe queue with `statuses` on the next delete request
    ///
    /// `None` entries mean "does not exist".
    pub fn on_delete(&self, stack_name: &str, statuses: &[Option<&str>]) -> &Self {
        let script = statuses
            .iter()
            .map(|status| match status {
                Some(status) => Ok(StackDescription::new(stack_name, *status)),
                None => Err(not_found(stack_name)),
            })
            .collect();
        self.with_stack(stack_name, |s| s.after_delete.push_back(script));
        self
    }

    /// Serve `pages` in order, with generated continuation tokens
    pub fn set_pages(&self, stack_name: &str, pages: Vec<Vec<StackResource>>) -> &Self {
        self.with_stack(stack_name, |s| s.pages = pages);
        self
    }

    /// Serve a continuation token on every page, forever
    pub fn set_endless_pages(&self, stack_name: &str) -> &Self {
        self.with_stack(stack_name, |s| s.endless_pages = true);
        self
    }

    /// Fail the next delete request
    pub fn fail_delete(&self, stack_name: &str, error: ServiceError) -> &Self {
        self.with_stack(stack_name, |s| s.delete_error = Some(error));
        self
    }

    /// Fail every listing request
    pub fn fail_listing(&self, stack_name: &str, error: ServiceError) -> &Self {
        self.with_stack(stack_name, |s| s.list_error = Some(error));
        self
    }

    pub fn delete_calls(&self) -> Vec<DeleteCall> {
        self.lock().deletes.clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.lock().describe_calls
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }
}

fn page_token(index: usize) -> String {
    format!("page-{}", index)
}

fn page_index(token: Option<&str>) -> usize {
    token
        .and_then(|t| t.strip_prefix("page-"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl StackClient for InMemoryStackClient {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn delete_stack(
        &self,
        stack_name: &str,
        retain_resources: &BTreeSet<String>,
    ) -> std::result::Result<(), ServiceError> {
        let mut inner = self.lock();
        inner.deletes.push(DeleteCall {
            stack: stack_name.to_string(),
            retained: retain_resources.clone(),
        });

        let script = inner.stacks.entry(stack_name.to_string()).or_default();
        if let Some(error) = script.delete_error.take() {
            return Err(error);
        }
        if let Some(next) = script.after_delete.pop_front() {
            script.describe = next.into();
        }
        Ok(())
    }

    async fn describe_stack(
        &self,
        stack_name: &str,
    ) -> std::result::Result<StackDescription, ServiceError> {
        let mut inner = self.lock();
        inner.describe_calls += 1;

        let Some(script) = inner.stacks.get_mut(stack_name) else {
            return Err(not_found(stack_name));
        };
        let next = if script.describe.len() > 1 {
            script.describe.pop_front()
        } else {
            script.describe.front().cloned()
        };
        next.unwrap_or_else(|| Err(not_found(stack_name)))
    }

    async fn list_stack_resources(
        &self,
        stack_name: &str,
        next_token: Option<&str>,
    ) -> std::result::Result<ResourcePage, ServiceError> {
        let mut inner = self.lock();
        inner.list_calls += 1;

        let Some(script) = inner.stacks.get(stack_name) else {
            return Ok(ResourcePage::default());
        };
        if let Some(error) = &script.list_error {
            return Err(error.clone());
        }

        let index = page_index(next_token);
        if script.endless_pages {
            return Ok(ResourcePage::default().with_next_token(page_token(index + 1)));
        }

        let resources = script.pages.get(index).cloned().unwrap_or_default();
        let page = ResourcePage::new(resources);
        if index + 1 < script.pages.len() {
            Ok(page.with_next_token(page_token(index + 1)))
        } else {
            Ok(page)
        }
    }
}
