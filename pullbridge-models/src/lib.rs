pub mod errors;
mod message;
mod subscription;

pub use message::{AckHandle, Delivery, Message, PullRequest};
pub use subscription::Subscription;
