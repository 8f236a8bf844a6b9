use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use pullbridge_models::{AckHandle, Message, PullRequest, Subscription};
use pullbridge_registry::RegistryKey;
use pullbridge_wire::WireClient;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::options::ValidatedOptions;

/// Event consumed by the fetch actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchEvent {
    /// Downstream can take this many more messages.
    Demand(u64),
    /// A scheduled wakeup (immediate re-poll or cool-down) arrived.
    TimerFired,
}

/// What the actor wants scheduled after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reschedule {
    None,
    Immediate,
    CoolDown,
}

/// Private state of the fetch/demand loop. All mutation happens on the one
/// actor task that owns this struct, so no locking is needed.
pub(crate) struct FetchLoop {
    key: RegistryKey,
    subscription: Subscription,
    client: Arc<dyn WireClient>,
    output: mpsc::Sender<Message>,
    demand: u64,
    max_messages: u64,
    return_immediately: Option<bool>,
    cool_down: Duration,
    timer_pending: bool,
    disconnected: bool,
}

impl FetchLoop {
    pub(crate) fn new(
        key: RegistryKey,
        options: ValidatedOptions,
        client: Arc<dyn WireClient>,
        output: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            key,
            subscription: options.subscription,
            client,
            output,
            demand: 0,
            max_messages: options.max_messages,
            return_immediately: options.return_immediately,
            cool_down: options.poll_interval,
            timer_pending: false,
            disconnected: false,
        }
    }

    pub(crate) async fn handle(&mut self, event: FetchEvent) -> Reschedule {
        match event {
            FetchEvent::Demand(count) => {
                self.demand += count;
                self.service_demand().await
            }
            FetchEvent::TimerFired => {
                self.timer_pending = false;
                self.service_demand().await
            }
        }
    }

    /// One servicing pass. A no-op while a wakeup is already pending or
    /// demand is zero, which is also what guarantees at most one pull in
    /// flight per consumer.
    async fn service_demand(&mut self) -> Reschedule {
        if self.timer_pending || self.demand == 0 {
            return Reschedule::None;
        }

        let request = PullRequest {
            max_messages: self.demand.min(self.max_messages),
            return_immediately: self.return_immediately,
        };
        let batch = match self.client.pull(&self.subscription, request).await {
            Ok(batch) => batch,
            Err(err) => {
                // Degrade to periodic retry; the loop never terminates on a
                // fetch failure.
                warn!("Pull from {} failed: {}", self.subscription, err);
                Vec::new()
            }
        };

        if batch.is_empty() {
            debug!(
                "No messages available for {}; cooling down",
                self.subscription
            );
            self.timer_pending = true;
            return Reschedule::CoolDown;
        }

        let mut emitted: u64 = 0;
        for delivery in batch {
            let message = Message {
                payload: delivery.payload,
                publish_time: delivery.publish_time,
                acknowledger: AckHandle {
                    registry_key: self.key,
                    ack_id: delivery.ack_id,
                },
            };
            if self.output.send(message).await.is_err() {
                // Downstream receiver is gone; the runner stops the actor.
                self.disconnected = true;
                break;
            }
            emitted += 1;
        }

        // Saturating keeps the counter non-negative even if a backend hands
        // back more than was asked for.
        self.demand = self.demand.saturating_sub(emitted);

        if self.disconnected || self.demand == 0 {
            Reschedule::None
        } else {
            // Short batch under open demand: retry promptly, via a zero-delay
            // wakeup rather than recursion.
            self.timer_pending = true;
            Reschedule::Immediate
        }
    }
}

pub(crate) async fn run(
    mut actor: FetchLoop,
    mut events: mpsc::Receiver<FetchEvent>,
    events_tx: mpsc::Sender<FetchEvent>,
    shutdown: Arc<Notify>,
) {
    let mut timer: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                debug!("Fetch loop for {} shutting down", actor.subscription);
                break;
            }
            maybe = events.recv() => {
                let Some(event) = maybe else { break };
                if matches!(event, FetchEvent::TimerFired) {
                    timer = None;
                }
                match actor.handle(event).await {
                    Reschedule::None => {}
                    Reschedule::Immediate => {
                        timer = Some(schedule(events_tx.clone(), Duration::ZERO));
                    }
                    Reschedule::CoolDown => {
                        timer = Some(schedule(events_tx.clone(), actor.cool_down));
                    }
                }
                if actor.disconnected {
                    break;
                }
            }
        }
    }

    if let Some(handle) = timer {
        handle.abort();
    }
}

fn schedule(events: mpsc::Sender<FetchEvent>, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        // The actor may already be gone during shutdown.
        let _ = events.send(FetchEvent::TimerFired).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pullbridge_models::Delivery;
    use pullbridge_registry::Registry;
    use pullbridge_wire::WireError;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedWire {
        responses: Mutex<VecDeque<Result<Vec<Delivery>, WireError>>>,
        pulls: Mutex<Vec<u64>>,
    }

    impl ScriptedWire {
        fn respond(&self, response: Result<Vec<Delivery>, WireError>) {
            self.responses.lock().push_back(response);
        }

        fn pull_sizes(&self) -> Vec<u64> {
            self.pulls.lock().clone()
        }
    }

    #[async_trait]
    impl WireClient for ScriptedWire {
        async fn pull(
            &self,
            _subscription: &Subscription,
            request: PullRequest,
        ) -> Result<Vec<Delivery>, WireError> {
            self.pulls.lock().push(request.max_messages);
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn acknowledge(
            &self,
            _subscription: &Subscription,
            _ack_ids: Vec<String>,
        ) -> Result<(), WireError> {
            Ok(())
        }
    }

    fn deliveries(count: usize) -> Vec<Delivery> {
        (0..count)
            .map(|index| Delivery {
                ack_id: format!("ack-{index}"),
                payload: format!("payload-{index}").into_bytes(),
                publish_time: None,
            })
            .collect()
    }

    fn actor(
        wire: Arc<ScriptedWire>,
        max_messages: u64,
    ) -> (FetchLoop, mpsc::Receiver<Message>) {
        let key = Registry::new().put(());
        let options = ValidatedOptions {
            subscription: Subscription::parse("projects/demo/subscriptions/events").unwrap(),
            max_messages,
            return_immediately: None,
            poll_interval: Duration::from_millis(5000),
        };
        let (output_tx, output_rx) = mpsc::channel(64);
        (FetchLoop::new(key, options, wire, output_tx), output_rx)
    }

    #[tokio::test]
    async fn short_batch_reschedules_immediately() {
        let wire = Arc::new(ScriptedWire::default());
        wire.respond(Ok(deliveries(3)));
        let (mut actor, mut output) = actor(wire.clone(), 10);

        let reschedule = actor.handle(FetchEvent::Demand(10)).await;

        assert_eq!(reschedule, Reschedule::Immediate);
        assert_eq!(actor.demand, 7);
        assert_eq!(wire.pull_sizes(), vec![10]);
        for _ in 0..3 {
            assert!(output.try_recv().is_ok());
        }
        assert!(output.try_recv().is_err());
    }

    #[tokio::test]
    async fn pull_is_capped_by_configured_max() {
        let wire = Arc::new(ScriptedWire::default());
        wire.respond(Ok(deliveries(10)));
        let (mut actor, _output) = actor(wire.clone(), 10);

        actor.handle(FetchEvent::Demand(25)).await;

        assert_eq!(wire.pull_sizes(), vec![10]);
        assert_eq!(actor.demand, 15);
    }

    #[tokio::test]
    async fn empty_batch_cools_down_and_keeps_demand() {
        let wire = Arc::new(ScriptedWire::default());
        wire.respond(Ok(Vec::new()));
        let (mut actor, mut output) = actor(wire.clone(), 10);

        let reschedule = actor.handle(FetchEvent::Demand(5)).await;

        assert_eq!(reschedule, Reschedule::CoolDown);
        assert_eq!(actor.demand, 5);
        assert!(output.try_recv().is_err());
    }

    #[tokio::test]
    async fn pull_error_is_treated_as_empty_batch() {
        let wire = Arc::new(ScriptedWire::default());
        wire.respond(Err(WireError::Transport("connection reset".into())));
        let (mut actor, mut output) = actor(wire.clone(), 10);

        let reschedule = actor.handle(FetchEvent::Demand(5)).await;

        assert_eq!(reschedule, Reschedule::CoolDown);
        assert_eq!(actor.demand, 5);
        assert!(output.try_recv().is_err());
    }

    #[tokio::test]
    async fn satisfied_demand_goes_idle_without_timer() {
        let wire = Arc::new(ScriptedWire::default());
        wire.respond(Ok(deliveries(2)));
        let (mut actor, _output) = actor(wire.clone(), 10);

        let reschedule = actor.handle(FetchEvent::Demand(2)).await;

        assert_eq!(reschedule, Reschedule::None);
        assert_eq!(actor.demand, 0);
        assert!(!actor.timer_pending);
    }

    #[tokio::test]
    async fn demand_while_timer_pending_does_not_pull() {
        let wire = Arc::new(ScriptedWire::default());
        wire.respond(Ok(Vec::new()));
        let (mut actor, _output) = actor(wire.clone(), 10);

        actor.handle(FetchEvent::Demand(5)).await;
        assert!(actor.timer_pending);

        let reschedule = actor.handle(FetchEvent::Demand(3)).await;

        assert_eq!(reschedule, Reschedule::None);
        assert_eq!(actor.demand, 8);
        assert_eq!(wire.pull_sizes().len(), 1, "second pull must be deferred");
    }

    #[tokio::test]
    async fn timer_fire_with_no_demand_goes_idle() {
        let wire = Arc::new(ScriptedWire::default());
        let (mut actor, _output) = actor(wire.clone(), 10);

        let reschedule = actor.handle(FetchEvent::TimerFired).await;

        assert_eq!(reschedule, Reschedule::None);
        assert!(wire.pull_sizes().is_empty());
    }

    #[tokio::test]
    async fn timer_fire_with_demand_services_it() {
        let wire = Arc::new(ScriptedWire::default());
        wire.respond(Ok(Vec::new()));
        wire.respond(Ok(deliveries(4)));
        let (mut actor, _output) = actor(wire.clone(), 10);

        actor.handle(FetchEvent::Demand(4)).await;
        let reschedule = actor.handle(FetchEvent::TimerFired).await;

        assert_eq!(reschedule, Reschedule::None);
        assert_eq!(actor.demand, 0);
        assert_eq!(wire.pull_sizes(), vec![4, 4]);
    }

    #[tokio::test]
    async fn oversized_batch_cannot_drive_demand_negative() {
        let wire = Arc::new(ScriptedWire::default());
        wire.respond(Ok(deliveries(5)));
        let (mut actor, mut output) = actor(wire.clone(), 10);

        // Misbehaving backend returns more than the 3 that were requested.
        actor.handle(FetchEvent::Demand(3)).await;

        assert_eq!(actor.demand, 0);
        let mut received = 0;
        while output.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 5);
    }

    #[tokio::test]
    async fn handles_carry_the_consumer_registry_key() {
        let wire = Arc::new(ScriptedWire::default());
        wire.respond(Ok(deliveries(1)));
        let (mut actor, mut output) = actor(wire.clone(), 10);
        let key = actor.key;

        actor.handle(FetchEvent::Demand(1)).await;

        let message = output.try_recv().unwrap();
        assert_eq!(message.acknowledger.registry_key, key);
        assert_eq!(message.acknowledger.ack_id, "ack-0");
    }
}
