use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use pullbridge_models::{Delivery, PullRequest, Subscription};
use uuid::Uuid;

use crate::{WireClient, WireError};

#[derive(Default)]
struct WireState {
    queue: VecDeque<Delivery>,
    unacked: HashMap<String, Delivery>,
}

/// Queue backend held entirely in process memory. Used by tests and local
/// runs; deliveries move from the queue to an unacked map on pull and are
/// dropped from it on acknowledge.
#[derive(Clone, Default)]
pub struct InMemoryWire {
    state: Arc<Mutex<WireState>>,
}

impl InMemoryWire {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a payload as a pending delivery, returning its ack id.
    pub fn publish(&self, payload: Vec<u8>) -> String {
        let ack_id = Uuid::new_v4().to_string();
        let delivery = Delivery {
            ack_id: ack_id.clone(),
            payload,
            publish_time: Some(Utc::now()),
        };
        self.state.lock().queue.push_back(delivery);
        ack_id
    }

    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn unacked(&self) -> usize {
        self.state.lock().unacked.len()
    }
}

#[async_trait]
impl WireClient for InMemoryWire {
    async fn pull(
        &self,
        _subscription: &Subscription,
        request: PullRequest,
    ) -> Result<Vec<Delivery>, WireError> {
        let mut guard = self.state.lock();
        let mut batch = Vec::new();
        while (batch.len() as u64) < request.max_messages {
            match guard.queue.pop_front() {
                Some(delivery) => {
                    guard
                        .unacked
                        .insert(delivery.ack_id.clone(), delivery.clone());
                    batch.push(delivery);
                }
                None => break,
            }
        }
        Ok(batch)
    }

    async fn acknowledge(
        &self,
        _subscription: &Subscription,
        ack_ids: Vec<String>,
    ) -> Result<(), WireError> {
        let mut guard = self.state.lock();
        for ack_id in ack_ids {
            guard.unacked.remove(&ack_id);
        }
        Ok(())
    }
}
