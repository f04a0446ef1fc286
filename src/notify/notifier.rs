//! Fan-out delivery with an urgent attention mode

use super::sender::MessageSender;
use crate::watch::UserId;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Attention marker repeated after an urgent message
pub const URGENT_MARKER: &str = ":warning:";

/// Repeat behavior for urgent notifications
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub urgent_repeats: u32,
    pub urgent_delay: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            urgent_repeats: 5,
            urgent_delay: Duration::from_secs(1),
        }
    }
}

/// Delivers one message to a set of users.
///
/// A failed delivery to one user never blocks the rest. In urgent mode the
/// main message is followed by the attention marker a fixed number of times
/// with a fixed delay between repeats.
pub struct Notifier<S> {
    sender: S,
    config: NotifyConfig,
}

impl<S: MessageSender> Notifier<S> {
    pub fn new(sender: S, config: NotifyConfig) -> Self {
        Self { sender, config }
    }

    /// Send `message` to every user; returns how many deliveries succeeded
    pub async fn notify(&self, users: &[UserId], message: &str, urgent: bool) -> usize {
        let mut delivered = 0;

        for user in users {
            if let Err(e) = self.sender.send_to(user, message).await {
                warn!(%user, error = %e, "Delivery failed");
                continue;
            }
            delivered += 1;

            if urgent {
                for _ in 0..self.config.urgent_repeats {
                    if let Err(e) = self.sender.send_to(user, URGENT_MARKER).await {
                        warn!(%user, error = %e, "Urgent marker delivery failed");
                        break;
                    }
                    sleep(self.config.urgent_delay).await;
                }
            }
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, String)>>,
        fail_for: Option<String>,
    }

    impl RecordingSender {
        fn failing_for(user: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_for: Some(user.to_string()),
            }
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl MessageSender for &RecordingSender {
        async fn send_to(&self, user: &str, message: &str) -> Result<()> {
            if self.fail_for.as_deref() == Some(user) {
                return Err(anyhow!("unreachable user"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((user.to_string(), message.to_string()));
            Ok(())
        }
    }

    fn fast_config(repeats: u32) -> NotifyConfig {
        NotifyConfig {
            urgent_repeats: repeats,
            urgent_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_plain_notification_one_message_per_user() {
        let sender = RecordingSender::default();
        let notifier = Notifier::new(&sender, fast_config(5));

        let users = vec!["alice".to_string(), "bob".to_string()];
        let delivered = notifier.notify(&users, "seats open", false).await;

        assert_eq!(delivered, 2);
        let sent = sender.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], ("alice".to_string(), "seats open".to_string()));
        assert_eq!(sent[1], ("bob".to_string(), "seats open".to_string()));
    }

    #[tokio::test]
    async fn test_urgent_notification_repeats_marker() {
        let sender = RecordingSender::default();
        let notifier = Notifier::new(&sender, fast_config(3));

        let users = vec!["alice".to_string()];
        notifier.notify(&users, "seats open", true).await;

        let sent = sender.sent();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0].1, "seats open");
        assert!(sent[1..].iter().all(|(_, m)| m == URGENT_MARKER));
    }

    #[tokio::test]
    async fn test_failed_recipient_does_not_block_others() {
        let sender = RecordingSender::failing_for("alice");
        let notifier = Notifier::new(&sender, fast_config(2));

        let users = vec!["alice".to_string(), "bob".to_string()];
        let delivered = notifier.notify(&users, "seats open", true).await;

        assert_eq!(delivered, 1);
        let sent = sender.sent();
        assert!(sent.iter().all(|(user, _)| user == "bob"));
        assert_eq!(sent.len(), 3); // message + 2 markers
    }
}
