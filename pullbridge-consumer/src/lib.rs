mod ack;
mod entry;
mod fetch;
mod options;

pub use ack::acknowledge;
pub use entry::{consumer_registry, ConsumerEntry};
pub use options::ConsumerOptions;

use std::sync::Arc;

use fetch::{FetchEvent, FetchLoop};
use pullbridge_models::errors::ConfigError;
use pullbridge_models::Message;
use pullbridge_registry::RegistryKey;
use pullbridge_wire::{CredentialPolicy, WireClient};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

/// Handle to a running pull consumer. Dropping the handle leaves the actor
/// running; call [`Consumer::stop`] for an orderly shutdown.
pub struct Consumer {
    events: mpsc::Sender<FetchEvent>,
    shutdown: Arc<Notify>,
    key: RegistryKey,
    task: JoinHandle<()>,
}

impl Consumer {
    /// Validates the options, registers the consumer entry, and spawns the
    /// fetch actor. Returns the handle plus the downstream message stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        options: ConsumerOptions,
        client: Arc<dyn WireClient>,
        credentials: Arc<dyn CredentialPolicy>,
    ) -> Result<(Consumer, mpsc::Receiver<Message>), ConfigError> {
        let validated = options.validate()?;

        let key = consumer_registry().put(ConsumerEntry {
            subscription: validated.subscription.clone(),
            credentials,
            client: client.clone(),
        });

        let (events_tx, events_rx) = mpsc::channel(32);
        let (output_tx, output_rx) = mpsc::channel(validated.max_messages.max(1) as usize);
        let shutdown = Arc::new(Notify::new());

        let actor = FetchLoop::new(key, validated, client, output_tx);
        let task = tokio::spawn(fetch::run(
            actor,
            events_rx,
            events_tx.clone(),
            shutdown.clone(),
        ));

        Ok((
            Consumer {
                events: events_tx,
                shutdown,
                key,
                task,
            },
            output_rx,
        ))
    }

    /// The registry key under which this consumer's configuration is stored.
    pub fn registry_key(&self) -> RegistryKey {
        self.key
    }

    /// Signal that the downstream can take `count` more messages.
    pub async fn request(&self, count: u64) {
        if count == 0 {
            return;
        }
        // Send only fails once the actor has shut down.
        let _ = self.events.send(FetchEvent::Demand(count)).await;
    }

    /// Stop the actor, cancel any pending wakeup, and release the registry
    /// entry. No pull or acknowledge is issued by this consumer afterwards.
    pub async fn stop(self) {
        self.shutdown.notify_one();
        let _ = self.task.await;
        consumer_registry().release(self.key);
    }
}
