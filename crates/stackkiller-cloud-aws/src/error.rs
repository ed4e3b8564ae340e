//! AWS client construction errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("Invalid endpoint URL '{0}': expected http:// or https://")]
    InvalidEndpoint(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),
}

pub type Result<T> = std::result::Result<T, AwsError>;
