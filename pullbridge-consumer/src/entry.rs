use std::sync::Arc;

use once_cell::sync::Lazy;
use pullbridge_models::Subscription;
use pullbridge_registry::Registry;
use pullbridge_wire::{CredentialPolicy, WireClient};

/// Immutable per-consumer configuration, shared by reference: every message
/// a consumer emits carries a registry key pointing at one of these instead
/// of a copy of the credential-bearing configuration.
pub struct ConsumerEntry {
    pub subscription: Subscription,
    pub credentials: Arc<dyn CredentialPolicy>,
    pub client: Arc<dyn WireClient>,
}

static CONSUMERS: Lazy<Registry<ConsumerEntry>> = Lazy::new(Registry::new);

/// Process-wide registry of live consumer entries. Entries are created by
/// [`Consumer::start`](crate::Consumer::start) and released by
/// [`Consumer::stop`](crate::Consumer::stop).
pub fn consumer_registry() -> &'static Registry<ConsumerEntry> {
    &CONSUMERS
}
