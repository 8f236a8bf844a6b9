use std::fmt;

use thiserror::Error;

pub type SendableError = Box<dyn std::error::Error + Send + Sync>;

/// Rejected consumer configuration. Raised before any state is built or any
/// network call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("subscription must look like projects/<project>/subscriptions/<name>, got '{0}'")]
    InvalidSubscription(String),
    #[error("max messages per pull must be at least 1, got {0}")]
    InvalidMaxMessages(u64),
    #[error("poll interval must be non-zero")]
    InvalidPollInterval,
}

#[derive(Debug)]
pub struct RuntimeError {
    code: String,
    message: String,
}

impl RuntimeError {
    pub fn new(code: String, message: String) -> Self {
        Self { code, message }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
