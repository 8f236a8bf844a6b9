use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pullbridge_models::{Delivery, PullRequest, Subscription};
use reqwest::{Client, RequestBuilder, StatusCode, Url};

use crate::http::types::{AcknowledgeBody, PullBody, PullResponse};
use crate::{CredentialPolicy, WireClient, WireError};

/// Wire client speaking the queue service's REST surface over HTTP.
#[derive(Clone)]
pub struct HttpWire {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialPolicy>,
    scope: String,
}

impl HttpWire {
    pub fn new(
        base_url: Url,
        client: Client,
        credentials: Arc<dyn CredentialPolicy>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            credentials,
            scope: scope.into(),
        }
    }

    fn endpoint(&self, subscription: &Subscription, verb: &str) -> Result<Url, WireError> {
        let path = format!(
            "v1/projects/{}/subscriptions/{}:{}",
            subscription.project_id, subscription.subscription_id, verb
        );
        self.base_url
            .join(&path)
            .map_err(|err| WireError::Transport(err.to_string()))
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, WireError> {
        match self.credentials.token(&self.scope).await? {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Ok(request),
        }
    }
}

#[async_trait]
impl WireClient for HttpWire {
    async fn pull(
        &self,
        subscription: &Subscription,
        request: PullRequest,
    ) -> Result<Vec<Delivery>, WireError> {
        let url = self.endpoint(subscription, "pull")?;
        let body = PullBody {
            max_messages: request.max_messages,
            return_immediately: request.return_immediately,
        };
        let response = self
            .authorize(self.client.post(url).json(&body))
            .await?
            .send()
            .await
            .map_err(|err| WireError::Transport(err.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let payload = response
                    .json::<PullResponse>()
                    .await
                    .map_err(|err| WireError::MalformedResponse(err.to_string()))?;

                let mut deliveries = Vec::with_capacity(payload.received_messages.len());
                for received in payload.received_messages {
                    let payload_bytes = BASE64.decode(received.message.data.as_bytes()).map_err(
                        |err| {
                            WireError::MalformedResponse(format!(
                                "payload for ack id {}: {}",
                                received.ack_id, err
                            ))
                        },
                    )?;
                    deliveries.push(Delivery {
                        ack_id: received.ack_id,
                        payload: payload_bytes,
                        publish_time: received.message.publish_time,
                    });
                }
                Ok(deliveries)
            }
            status => Err(WireError::UnexpectedStatus {
                operation: "pull",
                status: status.as_u16(),
            }),
        }
    }

    async fn acknowledge(
        &self,
        subscription: &Subscription,
        ack_ids: Vec<String>,
    ) -> Result<(), WireError> {
        let url = self.endpoint(subscription, "acknowledge")?;
        let response = self
            .authorize(self.client.post(url).json(&AcknowledgeBody { ack_ids }))
            .await?
            .send()
            .await
            .map_err(|err| WireError::Transport(err.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(WireError::UnexpectedStatus {
                operation: "acknowledge",
                status: status.as_u16(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Anonymous;

    fn wire() -> HttpWire {
        HttpWire::new(
            Url::parse("https://pubsub.example.com/").unwrap(),
            Client::new(),
            Arc::new(Anonymous),
            crate::PUBSUB_SCOPE,
        )
    }

    #[test]
    fn endpoint_builds_rest_paths() {
        let subscription = Subscription::parse("projects/acme/subscriptions/events").unwrap();
        let url = wire().endpoint(&subscription, "pull").unwrap();
        assert_eq!(
            url.as_str(),
            "https://pubsub.example.com/v1/projects/acme/subscriptions/events:pull"
        );
        let url = wire().endpoint(&subscription, "acknowledge").unwrap();
        assert!(url.as_str().ends_with(":acknowledge"));
    }
}
