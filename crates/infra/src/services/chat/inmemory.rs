use super::{ChatDelivery, IChatChannel};
use passgate_domain::MembershipStatus;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryChatDelivery {
    pub chat_id: i64,
    pub delivery: ChatDelivery,
}

/// Chat channel that keeps every delivery in memory. Used by tests and
/// local runs without a bot token.
#[derive(Default)]
pub struct InMemoryChatChannel {
    deliveries: Mutex<Vec<InMemoryChatDelivery>>,
    failing_chats: Mutex<HashSet<i64>>,
    memberships: Mutex<HashMap<(i64, i64), MembershipStatus>>,
    delay: Mutex<Option<Duration>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryChatChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery to `chat_id` fails from now on
    pub fn fail_for(&self, chat_id: i64) {
        lock(&self.failing_chats).insert(chat_id);
    }

    pub fn recover(&self, chat_id: i64) {
        lock(&self.failing_chats).remove(&chat_id);
    }

    /// Every delivery waits `delay` before it completes
    pub fn set_delay(&self, delay: Option<Duration>) {
        *lock(&self.delay) = delay;
    }

    pub fn set_membership(&self, channel_id: i64, user_id: i64, status: MembershipStatus) {
        lock(&self.memberships).insert((channel_id, user_id), status);
    }

    pub fn deliveries(&self) -> Vec<InMemoryChatDelivery> {
        lock(&self.deliveries).clone()
    }

    pub fn deliveries_to(&self, chat_id: i64) -> Vec<ChatDelivery> {
        lock(&self.deliveries)
            .iter()
            .filter(|d| d.chat_id == chat_id)
            .map(|d| d.delivery.clone())
            .collect()
    }

    async fn deliver(&self, chat_id: i64, delivery: ChatDelivery) -> anyhow::Result<()> {
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if lock(&self.failing_chats).contains(&chat_id) {
            return Err(anyhow::anyhow!("Chat {} is unreachable", chat_id));
        }
        lock(&self.deliveries).push(InMemoryChatDelivery { chat_id, delivery });
        Ok(())
    }
}

#[async_trait::async_trait]
impl IChatChannel for InMemoryChatChannel {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.deliver(
            chat_id,
            ChatDelivery::Message {
                text: text.to_string(),
            },
        )
        .await
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> anyhow::Result<()> {
        self.deliver(
            chat_id,
            ChatDelivery::Document {
                file_name: file_name.to_string(),
                content,
                caption: caption.to_string(),
            },
        )
        .await
    }

    /// Unknown memberships count as `Left`
    async fn get_membership(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> anyhow::Result<MembershipStatus> {
        if lock(&self.failing_chats).contains(&channel_id) {
            return Err(anyhow::anyhow!("Chat {} is unreachable", channel_id));
        }
        Ok(lock(&self.memberships)
            .get(&(channel_id, user_id))
            .copied()
            .unwrap_or(MembershipStatus::Left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_deliveries_and_injected_failures() {
        let chat = InMemoryChatChannel::new();
        chat.fail_for(2);

        assert!(chat.send_message(1, "hello").await.is_ok());
        assert!(chat.send_message(2, "hello").await.is_err());
        assert_eq!(
            chat.deliveries_to(1),
            vec![ChatDelivery::Message {
                text: "hello".into()
            }]
        );
        assert!(chat.deliveries_to(2).is_empty());

        chat.recover(2);
        assert!(chat.send_message(2, "again").await.is_ok());
        assert_eq!(chat.deliveries().len(), 2);
    }

    #[tokio::test]
    async fn unknown_membership_is_left() {
        let chat = InMemoryChatChannel::new();
        chat.set_membership(-100, 1, MembershipStatus::Administrator);
        assert_eq!(
            chat.get_membership(-100, 1).await.unwrap(),
            MembershipStatus::Administrator
        );
        assert_eq!(chat.get_membership(-100, 2).await.unwrap(), MembershipStatus::Left);
    }
}
