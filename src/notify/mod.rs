//! Notification delivery: sender backends and urgent fan-out

pub mod notifier;
pub mod sender;
pub mod webhook;

pub use notifier::{Notifier, NotifyConfig, URGENT_MARKER};
pub use sender::{AnySender, ConsoleSender, MessageSender};
pub use webhook::{WebhookConfig, WebhookSender};
