use clap::Parser;
use pullbridge_models::errors::SendableError;

#[derive(Debug, Clone)]
pub struct Config {
    pub subscription: String,
    pub backend: String,
    pub endpoint: String,
    pub token: Option<String>,
    pub max_messages: u64,
    pub poll_interval_ms: u64,
    pub batch: u64,
    pub seed: u64,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Subscription to drain, shape projects/<project>/subscriptions/<name>.
    #[arg(long)]
    subscription: String,

    #[arg(long, default_value = "in-memory")]
    backend: String,

    #[arg(long, default_value = "https://pubsub.googleapis.com/")]
    endpoint: String,

    /// Bearer token for the http backend; anonymous when omitted.
    #[arg(long)]
    token: Option<String>,

    #[arg(long, default_value_t = 10)]
    max_messages: u64,

    #[arg(long, default_value_t = 5000)]
    poll_interval_ms: u64,

    /// How much demand to keep open at once.
    #[arg(long, default_value_t = 10)]
    batch: u64,

    /// Number of demo messages to preload into the in-memory backend.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

pub fn parse_config() -> Result<Config, SendableError> {
    let args = CliArgs::parse();

    Ok(Config {
        subscription: args.subscription,
        backend: args.backend,
        endpoint: args.endpoint,
        token: args.token,
        max_messages: args.max_messages,
        poll_interval_ms: args.poll_interval_ms,
        batch: args.batch,
        seed: args.seed,
    })
}
