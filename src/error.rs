//! Unified infrastructure error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that stop the service from starting or serving.
///
/// Request-level failures (400, 429, 500, …) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("smtp transport: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
