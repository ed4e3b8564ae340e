//! AWS CloudFormation provider for StackKiller
//!
//! Implements [`stackkiller_cloud::StackClient`] on top of
//! `aws-sdk-cloudformation`, against either AWS or a local simulator.
//!
//! # Example
//!
//! ```ignore
//! use stackkiller_cloud_aws::{CloudFormationClient, Target};
//!
//! let client = CloudFormationClient::connect(&Target::local("http://localhost:4566"), None).await?;
//! ```

pub mod cloudformation;
pub mod error;

pub use cloudformation::{CloudFormationClient, DEFAULT_LOCAL_ENDPOINT, Target};
pub use error::{AwsError, Result};
