use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Fully qualified identity of a remote subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscription {
    pub project_id: String,
    pub subscription_id: String,
}

impl Subscription {
    /// Parses the canonical `projects/<project>/subscriptions/<name>` form.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let mut parts = value.split('/');
        match (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) {
            (Some("projects"), Some(project), Some("subscriptions"), Some(name), None)
                if !project.is_empty() && !name.is_empty() =>
            {
                Ok(Self {
                    project_id: project.to_string(),
                    subscription_id: name.to_string(),
                })
            }
            _ => Err(ConfigError::InvalidSubscription(value.to_string())),
        }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/subscriptions/{}",
            self.project_id, self.subscription_id
        )
    }
}
