//! Observability utilities shared by gateway services

pub mod logging;

pub use logging::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("Invalid observability configuration: {0}")]
    Config(String),
}

pub type ObservabilityResult<T> = Result<T, ObservabilityError>;
