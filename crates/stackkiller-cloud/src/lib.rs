//! StackKiller core
//!
//! This crate holds the stack deletion state machine. It is provider-neutral:
//! a [`StackClient`] implementation supplies the remote calls.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                StackKiller CLI                   │
//! │          (stackkiller delete / status)           │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               stackkiller-cloud                  │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │             StackDeleter                  │   │
//! │  │  delete → wait → classify → retain/retry  │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │    Waiter    │  │  Classifier  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │ trait StackClient
//! ┌─────────────────▼───────────────────────────────┐
//! │   stackkiller-cloud-aws (CloudFormation/local)   │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use stackkiller_cloud::{DeleteSettings, StackDeleter};
//! use tokio_util::sync::CancellationToken;
//!
//! let deleter = StackDeleter::new(client, DeleteSettings::default());
//! let outcome = deleter
//!     .delete_stack("my-stack", true, Duration::from_secs(1800), &CancellationToken::new())
//!     .await?;
//! assert!(outcome.is_deleted());
//! ```

pub mod client;
pub mod deleter;
pub mod error;
pub mod stack;
pub mod status;
pub mod waiter;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use client::StackClient;
pub use deleter::{DeleteSettings, StackDeleter};
pub use error::{Result, ServiceError, StackError};
pub use stack::{
    DELETE_FAILED, DeletionOutcome, ResourcePage, StackDescription, StackResource, StackStatus,
};
pub use status::classify;
pub use waiter::{DEFAULT_POLL_INTERVAL, WaitConfig, wait_for_deletion};

pub use tokio_util::sync::CancellationToken;
