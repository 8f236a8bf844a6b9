use std::time::Duration;

use pullbridge_models::errors::ConfigError;
use pullbridge_models::Subscription;
use pullbridge_wire::PUBSUB_SCOPE;

/// Producer-facing configuration for a pull consumer.
#[derive(Debug, Clone)]
pub struct ConsumerOptions {
    /// Required, shape `projects/<project>/subscriptions/<name>`.
    pub subscription: String,
    /// Upper bound on messages per pull call.
    pub max_messages: u64,
    /// Passed through to the wire client unchanged.
    pub return_immediately: Option<bool>,
    /// Cool-down between polls while the queue is empty.
    pub poll_interval: Duration,
    /// OAuth scope handed to the credential policy.
    pub scope: String,
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self {
            subscription: String::new(),
            max_messages: 10,
            return_immediately: None,
            poll_interval: Duration::from_millis(5000),
            scope: PUBSUB_SCOPE.to_string(),
        }
    }
}

impl ConsumerOptions {
    pub fn new(subscription: impl Into<String>) -> Self {
        Self {
            subscription: subscription.into(),
            ..Self::default()
        }
    }

    /// Boundary check run before any consumer state is built. Fails
    /// atomically: nothing is registered or spawned on error.
    pub(crate) fn validate(&self) -> Result<ValidatedOptions, ConfigError> {
        let subscription = Subscription::parse(&self.subscription)?;
        if self.max_messages == 0 {
            return Err(ConfigError::InvalidMaxMessages(self.max_messages));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidPollInterval);
        }
        Ok(ValidatedOptions {
            subscription,
            max_messages: self.max_messages,
            return_immediately: self.return_immediately,
            poll_interval: self.poll_interval,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ValidatedOptions {
    pub subscription: Subscription,
    pub max_messages: u64,
    pub return_immediately: Option<bool>,
    pub poll_interval: Duration,
}
