//! Message delivery seam and the console fallback sender

use anyhow::Result;
use std::future::Future;

use super::webhook::WebhookSender;

/// Delivers one message to one user. Resolution of a user id to an actual
/// destination (chat account, webhook target) lives behind this trait.
pub trait MessageSender: Send + Sync {
    fn send_to(&self, user: &str, message: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Fallback sender that prints deliveries to stdout
#[derive(Debug, Clone, Default)]
pub struct ConsoleSender;

impl MessageSender for ConsoleSender {
    async fn send_to(&self, user: &str, message: &str) -> Result<()> {
        println!("[notify:{}] {}", user, message);
        Ok(())
    }
}

/// Configured sender backend, chosen at startup
pub enum AnySender {
    Console(ConsoleSender),
    Webhook(WebhookSender),
}

impl MessageSender for AnySender {
    async fn send_to(&self, user: &str, message: &str) -> Result<()> {
        match self {
            AnySender::Console(sender) => sender.send_to(user, message).await,
            AnySender::Webhook(sender) => sender.send_to(user, message).await,
        }
    }
}
