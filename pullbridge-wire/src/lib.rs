pub mod credentials;
mod errors;
pub mod http;
pub mod in_memory;

pub use credentials::{Anonymous, CredentialPolicy, StaticToken, PUBSUB_SCOPE};
pub use errors::WireError;

use async_trait::async_trait;
use pullbridge_models::{Delivery, PullRequest, Subscription};

/// Trait implemented by transport backends able to pull deliveries from a
/// remote subscription and acknowledge them afterwards.
#[async_trait]
pub trait WireClient: Send + Sync + 'static {
    /// Fetch up to `request.max_messages` deliveries. An empty vector means
    /// the queue had nothing to hand out.
    async fn pull(
        &self,
        subscription: &Subscription,
        request: PullRequest,
    ) -> Result<Vec<Delivery>, WireError>;

    /// Acknowledge deliveries by their queue-assigned ack ids. Best effort:
    /// callers are expected to log failures and move on.
    async fn acknowledge(
        &self,
        subscription: &Subscription,
        ack_ids: Vec<String>,
    ) -> Result<(), WireError>;
}
