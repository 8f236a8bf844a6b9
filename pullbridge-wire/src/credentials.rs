use async_trait::async_trait;

use crate::WireError;

/// Default OAuth scope requested for queue-service calls.
pub const PUBSUB_SCOPE: &str = "https://www.googleapis.com/auth/pubsub";

/// Supplies bearer tokens for outbound wire calls.
#[async_trait]
pub trait CredentialPolicy: Send + Sync + 'static {
    /// Returns a token for the given scope, or `None` for unauthenticated
    /// access (emulators, in-process backends).
    async fn token(&self, scope: &str) -> Result<Option<String>, WireError>;
}

/// No authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

#[async_trait]
impl CredentialPolicy for Anonymous {
    async fn token(&self, _scope: &str) -> Result<Option<String>, WireError> {
        Ok(None)
    }
}

/// Fixed token handed in at startup, reused for every call.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialPolicy for StaticToken {
    async fn token(&self, _scope: &str) -> Result<Option<String>, WireError> {
        Ok(Some(self.token.clone()))
    }
}
