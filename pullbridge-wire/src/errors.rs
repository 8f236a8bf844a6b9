use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("credential acquisition failed: {0}")]
    Credentials(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {status} from {operation}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
    },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
