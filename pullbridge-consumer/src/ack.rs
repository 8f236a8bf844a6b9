use std::collections::HashMap;

use log::warn;
use pullbridge_models::AckHandle;
use pullbridge_registry::RegistryKey;

use crate::entry::consumer_registry;

/// Acknowledge processed messages back to their queue.
///
/// Runs on the caller's task and only reads immutable registry entries, so
/// it never contends with the fetch loop. Wire failures are logged and
/// dropped on purpose: the messages were already delivered and processed,
/// and anything left unacknowledged is simply redelivered by the queue.
/// This makes the adapter an at-least-once pipeline, not exactly-once.
pub async fn acknowledge(handles: Vec<AckHandle>) {
    if handles.is_empty() {
        return;
    }

    // One consumer issues one key, so in the common case this is a single
    // group; grouping still keeps mixed-origin batches correct.
    let mut groups: HashMap<RegistryKey, Vec<String>> = HashMap::new();
    for handle in handles {
        groups
            .entry(handle.registry_key)
            .or_default()
            .push(handle.ack_id);
    }

    for (key, ack_ids) in groups {
        let entry = consumer_registry().get(key);
        if let Err(err) = entry.client.acknowledge(&entry.subscription, ack_ids).await {
            warn!(
                "Acknowledge for {} failed (messages will be redelivered): {}",
                entry.subscription, err
            );
        }
    }
}
