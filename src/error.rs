use std::collections::TryReserveError;
use thiserror::Error;

use crate::config::FilterConfigBuilderError;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Failed to allocate table of {size_k} slots: {source}")]
    AllocationError {
        size_k: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("Table size must be greater than 0")]
    ZeroCapacity,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse environment variable {var_name}: value '{value}' - {error}")]
    EnvParseError {
        var_name: String,
        value: String,
        error: String,
    },
}

impl From<FilterConfigBuilderError> for FilterError {
    fn from(err: FilterConfigBuilderError) -> Self {
        FilterError::InvalidConfig(err.to_string())
    }
}
