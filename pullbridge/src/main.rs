mod config;

use std::sync::Arc;
use std::time::Duration;

use config::parse_config;
use log::{error, info};
use pullbridge_consumer::{acknowledge, Consumer, ConsumerOptions};
use pullbridge_models::errors::{RuntimeError, SendableError};
use pullbridge_utilities::startup;
use pullbridge_wire::http::HttpWire;
use pullbridge_wire::in_memory::InMemoryWire;
use pullbridge_wire::{Anonymous, CredentialPolicy, StaticToken, WireClient};

#[tokio::main]
async fn main() -> Result<(), SendableError> {
    startup::startup("Pullbridge Consumer")?;

    let config = parse_config()?;
    info!("Draining {}", config.subscription);

    let mut options = ConsumerOptions::new(config.subscription.clone());
    options.max_messages = config.max_messages;
    options.poll_interval = Duration::from_millis(config.poll_interval_ms);

    let (client, credentials) = build_wire(&config, &options.scope)?;

    let (consumer, mut messages) = Consumer::start(options, client, credentials)?;
    consumer.request(config.batch).await;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    error!("Failed to listen for Ctrl+C: {}", err);
                }
                info!("Shutdown signal received. Stopping consumer...");
                break;
            }
            maybe = messages.recv() => {
                let Some(message) = maybe else {
                    info!("Message stream closed");
                    break;
                };
                info!(
                    "Received {} bytes (ack id {})",
                    message.payload.len(),
                    message.acknowledger.ack_id
                );
                acknowledge(vec![message.acknowledger]).await;
                consumer.request(1).await;
            }
        }
    }

    consumer.stop().await;
    Ok(())
}

fn build_wire(
    config: &config::Config,
    scope: &str,
) -> Result<(Arc<dyn WireClient>, Arc<dyn CredentialPolicy>), SendableError> {
    match config.backend.as_str() {
        "http" => {
            let url = reqwest::Url::parse(&config.endpoint).map_err(|err| {
                Box::new(RuntimeError::new(
                    "consumer.wire.invalid_endpoint".into(),
                    err.to_string(),
                )) as SendableError
            })?;

            let client = reqwest::Client::builder()
                .build()
                .map_err(|err| -> SendableError {
                    Box::new(RuntimeError::new(
                        "consumer.wire.client".into(),
                        err.to_string(),
                    ))
                })?;

            let credentials: Arc<dyn CredentialPolicy> = match &config.token {
                Some(token) => Arc::new(StaticToken::new(token.clone())),
                None => Arc::new(Anonymous),
            };

            Ok((
                Arc::new(HttpWire::new(url, client, credentials.clone(), scope)),
                credentials,
            ))
        }
        "in-memory" => {
            let wire = InMemoryWire::new();
            for index in 0..config.seed {
                wire.publish(format!("demo message {index}").into_bytes());
            }
            Ok((Arc::new(wire), Arc::new(Anonymous)))
        }
        other => Err(Box::new(RuntimeError::new(
            "consumer.wire.unknown_backend".into(),
            format!("Unknown wire backend '{other}'"),
        ))),
    }
}
