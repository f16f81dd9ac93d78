//! Configuration error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("missing required configuration: {0}")]
    Missing(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;
