use chrono::{DateTime, Utc};
use pullbridge_registry::RegistryKey;
use serde::{Deserialize, Serialize};

/// Sizing for a single pull call. `max_messages` is already capped to both
/// the configured maximum and the outstanding demand by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub max_messages: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_immediately: Option<bool>,
}

/// Raw unit returned by a wire pull: the payload plus the queue-assigned
/// token needed to acknowledge this particular delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub ack_id: String,
    pub payload: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<DateTime<Utc>>,
}

/// Everything needed to acknowledge one delivered message later, from any
/// worker. The registry key stands in for the full consumer configuration so
/// messages stay small while crossing pipeline boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckHandle {
    pub registry_key: RegistryKey,
    pub ack_id: String,
}

/// Message emitted downstream by the consumer. Ownership transfers to the
/// downstream pipeline on emission.
#[derive(Debug, Clone)]
pub struct Message {
    pub payload: Vec<u8>,
    pub acknowledger: AckHandle,
    pub publish_time: Option<DateTime<Utc>>,
}
